//! Maps provider condition codes to the icon drawn on the card and the accent
//! colour used for its headline text.

use image::Rgb;

use crate::{
    error::{Result, WeatherError},
    model::ConditionCode,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Icon {
    Sunny,
    PartlyCloudy,
    Cloudy,
    VeryCloudy,
    Fog,
    LightShowers,
    LightSleetShowers,
    LightSleet,
    ThunderyShowers,
    LightSnow,
    HeavySnow,
    LightRain,
    HeavyShowers,
    HeavyRain,
    LightSnowShowers,
    HeavySnowShowers,
    ThunderyHeavyRain,
    ThunderySnowShowers,
    Moon,
}

impl Icon {
    pub const fn all() -> &'static [Icon] {
        &[
            Icon::Sunny,
            Icon::PartlyCloudy,
            Icon::Cloudy,
            Icon::VeryCloudy,
            Icon::Fog,
            Icon::LightShowers,
            Icon::LightSleetShowers,
            Icon::LightSleet,
            Icon::ThunderyShowers,
            Icon::LightSnow,
            Icon::HeavySnow,
            Icon::LightRain,
            Icon::HeavyShowers,
            Icon::HeavyRain,
            Icon::LightSnowShowers,
            Icon::HeavySnowShowers,
            Icon::ThunderyHeavyRain,
            Icon::ThunderySnowShowers,
            Icon::Moon,
        ]
    }

    /// File name (without extension) of the icon in the asset directory.
    pub fn file_stem(&self) -> &'static str {
        match self {
            Icon::Sunny => "Sunny",
            Icon::PartlyCloudy => "PartlyCloudy",
            Icon::Cloudy => "Cloudy",
            Icon::VeryCloudy => "VeryCloudy",
            Icon::Fog => "Fog",
            Icon::LightShowers => "LightShowers",
            Icon::LightSleetShowers => "LightSleetShowers",
            Icon::LightSleet => "LightSleet",
            Icon::ThunderyShowers => "ThunderyShowers",
            Icon::LightSnow => "LightSnow",
            Icon::HeavySnow => "HeavySnow",
            Icon::LightRain => "LightRain",
            Icon::HeavyShowers => "HeavyShowers",
            Icon::HeavyRain => "HeavyRain",
            Icon::LightSnowShowers => "LightSnowShowers",
            Icon::HeavySnowShowers => "HeavySnowShowers",
            Icon::ThunderyHeavyRain => "ThunderyHeavyRain",
            Icon::ThunderySnowShowers => "ThunderySnowShowers",
            Icon::Moon => "Moon",
        }
    }

    pub fn accent(&self) -> Rgb<u8> {
        let [r, g, b] = match self {
            Icon::Sunny => [0xFE, 0xC0, 0x16],
            Icon::PartlyCloudy => [0xF5, 0x9E, 0x0B],
            Icon::Cloudy | Icon::VeryCloudy => [0x6B, 0x7F, 0x99],
            Icon::Fog => [0x8E, 0x9A, 0xA6],
            Icon::LightShowers | Icon::LightRain => [0x3B, 0x82, 0xF6],
            Icon::HeavyShowers | Icon::HeavyRain => [0x1D, 0x4E, 0xD8],
            Icon::LightSleet | Icon::LightSleetShowers => [0x5E, 0xA5, 0xC9],
            Icon::LightSnow | Icon::LightSnowShowers => [0x7D, 0xC4, 0xE4],
            Icon::HeavySnow | Icon::HeavySnowShowers => [0x4F, 0x9C, 0xC8],
            Icon::ThunderyShowers | Icon::ThunderyHeavyRain | Icon::ThunderySnowShowers => {
                [0x7C, 0x3A, 0xED]
            }
            Icon::Moon => [0x3C, 0x45, 0x8C],
        };
        Rgb([r, g, b])
    }
}

/// Icon and accent colour for one condition code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Condition {
    pub icon: Icon,
    pub accent: Rgb<u8>,
}

impl Condition {
    pub fn accent_hex(&self) -> String {
        let [r, g, b] = self.accent.0;
        format!("#{r:02X}{g:02X}{b:02X}")
    }
}

fn icon_for(code: &str) -> Option<Icon> {
    let icon = match code {
        "113" => Icon::Sunny,
        "116" => Icon::PartlyCloudy,
        "119" => Icon::Cloudy,
        "122" => Icon::VeryCloudy,
        "143" | "248" | "260" => Icon::Fog,
        "176" | "263" | "353" => Icon::LightShowers,
        "179" | "362" | "365" | "374" => Icon::LightSleetShowers,
        "182" | "185" | "281" | "284" | "311" | "314" | "317" | "350" | "377" => Icon::LightSleet,
        "200" | "386" => Icon::ThunderyShowers,
        "227" | "320" => Icon::LightSnow,
        "230" | "329" | "332" | "338" => Icon::HeavySnow,
        "266" | "293" | "296" => Icon::LightRain,
        "299" | "305" | "356" => Icon::HeavyShowers,
        "302" | "308" | "359" => Icon::HeavyRain,
        "323" | "326" | "368" => Icon::LightSnowShowers,
        "335" | "371" | "395" => Icon::HeavySnowShowers,
        "389" => Icon::ThunderyHeavyRain,
        "392" => Icon::ThunderySnowShowers,
        ConditionCode::MOON_CODE => Icon::Moon,
        _ => return None,
    };
    Some(icon)
}

/// Resolves a condition code. Unknown codes are an error: a card drawn with
/// the wrong icon is worse than no card.
pub fn lookup(code: &ConditionCode) -> Result<Condition> {
    let icon = icon_for(code.as_str()).ok_or_else(|| {
        tracing::warn!(code = %code, "no icon mapped for condition code");
        WeatherError::UnknownCondition(code.to_string())
    })?;

    Ok(Condition { icon, accent: icon.accent() })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> ConditionCode {
        ConditionCode::parse(s).expect("valid code")
    }

    #[test]
    fn known_codes_resolve() {
        let partly = lookup(&code("116")).expect("116 is mapped");
        assert_eq!(partly.icon, Icon::PartlyCloudy);
        assert_eq!(partly.accent_hex(), "#F59E0B");

        assert_eq!(lookup(&code("395")).expect("395 is mapped").icon, Icon::HeavySnowShowers);
        assert_eq!(lookup(&ConditionCode::moon()).expect("moon is mapped").icon, Icon::Moon);
    }

    #[test]
    fn lookup_is_stable() {
        for c in ["113", "143", "296", "389", "999"] {
            assert_eq!(lookup(&code(c)).ok(), lookup(&code(c)).ok());
        }
    }

    #[test]
    fn unknown_code_is_an_error() {
        for c in ["000", "114", "998"] {
            let err = lookup(&code(c)).unwrap_err();
            assert!(matches!(err, WeatherError::UnknownCondition(ref s) if s == c));
        }
    }

    #[test]
    fn every_icon_is_reachable_and_has_a_stem() {
        let codes = [
            "113", "116", "119", "122", "143", "176", "179", "182", "200", "227", "230", "266",
            "299", "302", "323", "335", "389", "392", "999",
        ];
        let mut reached: Vec<Icon> =
            codes.iter().map(|c| lookup(&code(c)).expect("mapped").icon).collect();
        reached.dedup();

        assert_eq!(reached.len(), Icon::all().len());
        assert!(Icon::all().iter().all(|i| !i.file_stem().is_empty()));
    }
}
