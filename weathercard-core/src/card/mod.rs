//! Weather card composition.
//!
//! A card is a background template with the current-condition icon, a few
//! text labels and, for hourly cards, a strip of six forecast icons plus a
//! marker showing how far through the local day we are. Every coordinate is a
//! fixed design constant tied to the template artwork.

use std::{fmt, io::Cursor, str::FromStr};

use image::{ImageFormat, Rgb, Rgba, RgbaImage, imageops};

use crate::{
    assets::{AssetBundle, FontKind, IconSize, Template},
    condition::{self, Condition},
    error::{Result, WeatherError},
    model::{HourlyForecast, HourlySample, WeatherSnapshot},
    recolor::{ICON_BASE_COLOUR, recolor},
};

pub mod text;

use text::{Anchor, TextLabel};

const ICON_POS: (i64, i64) = (100, 200);
const CITY_POS: (i32, i32) = (100, 148);
const TEMPERATURE_POS: (i32, i32) = (900, 132);
const SUBTITLE_POS: (i32, i32) = (100, 80);

const SLOT_CENTRES_X: [i32; 6] = [150, 290, 430, 570, 710, 850];
const SLOT_ICON_Y: i64 = 600;
const SLOT_TEMPERATURE_Y: i32 = 780;

/// Left edge of the day timeline drawn in the hourly templates.
const TIMELINE_X: i64 = 60;
const MARKER_Y: i64 = 900;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardMode {
    Simple = 0,
    HourlyLight = 1,
    HourlyDark = 2,
}

impl CardMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardMode::Simple => "simple",
            CardMode::HourlyLight => "hourly",
            CardMode::HourlyDark => "dark",
        }
    }

    pub const fn all() -> &'static [CardMode] {
        &[CardMode::Simple, CardMode::HourlyLight, CardMode::HourlyDark]
    }

    pub fn needs_forecast(&self) -> bool {
        !matches!(self, CardMode::Simple)
    }
}

impl fmt::Display for CardMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CardMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        CardMode::all()
            .iter()
            .copied()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!("Unknown card mode '{s}'. Supported modes: simple, hourly, dark.")
            })
    }
}

/// Colour of the city, temperature and time labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingColour {
    /// Use the current condition's accent colour.
    Accent,
    Fixed(Rgb<u8>),
}

impl HeadingColour {
    fn resolve(&self, condition: &Condition) -> Rgb<u8> {
        match self {
            HeadingColour::Accent => condition.accent,
            HeadingColour::Fixed(colour) => *colour,
        }
    }
}

/// Everything that differs between card modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardStyle {
    pub template: Template,
    /// Tint each hourly icon with its slot colour before pasting.
    pub recolor_icons: bool,
    pub slot_colours: [Rgb<u8>; 6],
    pub heading: HeadingColour,
}

const LIGHT_SLOTS: [Rgb<u8>; 6] = [
    Rgb([0x4A, 0x4A, 0x4A]),
    Rgb([0x4A, 0x4A, 0x4A]),
    Rgb([0x4A, 0x4A, 0x4A]),
    Rgb([0x4A, 0x4A, 0x4A]),
    Rgb([0x3C, 0x45, 0x8C]),
    Rgb([0x3C, 0x45, 0x8C]),
];

const DARK_SLOTS: [Rgb<u8>; 6] = [
    Rgb([0xFE, 0xE0, 0x8A]),
    Rgb([0xFE, 0xC0, 0x16]),
    Rgb([0xFB, 0x92, 0x3C]),
    Rgb([0xF4, 0x72, 0xB6]),
    Rgb([0xA7, 0x8B, 0xFA]),
    Rgb([0x81, 0x8C, 0xF8]),
];

/// Indexed by `CardMode as usize`.
const STYLES: [CardStyle; 3] = [
    CardStyle {
        template: Template::Simple,
        recolor_icons: false,
        slot_colours: LIGHT_SLOTS,
        heading: HeadingColour::Accent,
    },
    CardStyle {
        template: Template::HourlyLight,
        recolor_icons: false,
        slot_colours: LIGHT_SLOTS,
        heading: HeadingColour::Accent,
    },
    CardStyle {
        template: Template::HourlyDark,
        recolor_icons: true,
        slot_colours: DARK_SLOTS,
        heading: HeadingColour::Fixed(Rgb([0xFF, 0xFF, 0xFF])),
    },
];

pub fn style(mode: CardMode) -> &'static CardStyle {
    &STYLES[mode as usize]
}

/// Inputs for one card.
#[derive(Debug, Clone, Copy)]
pub struct CardInput<'a> {
    pub snapshot: &'a WeatherSnapshot,
    pub hourly: Option<&'a HourlyForecast>,
    /// Marker offset along the day timeline, see [`crate::daytime::daily_progress`].
    pub progress: i32,
    pub mode: CardMode,
}

/// Draws the card and returns it PNG-encoded. Conditions are resolved before
/// anything is drawn so a bad code never yields a half-finished card.
pub fn compose(assets: &AssetBundle, input: &CardInput<'_>) -> Result<Vec<u8>> {
    let style = style(input.mode);
    let current = condition::lookup(&input.snapshot.condition)?;

    let slots = if input.mode.needs_forecast() {
        let forecast = input
            .hourly
            .ok_or_else(|| WeatherError::MissingForecast(input.mode.to_string()))?;
        forecast
            .samples()
            .iter()
            .map(|sample| condition::lookup(&sample.condition).map(|c| (sample, c)))
            .collect::<Result<Vec<(&HourlySample, Condition)>>>()?
    } else {
        Vec::new()
    };

    let mut canvas = assets.template(style.template)?.clone();
    let icon = assets.icon(current.icon, IconSize::Large)?;
    imageops::overlay(&mut canvas, icon, ICON_POS.0, ICON_POS.1);

    let heading = opaque(style.heading.resolve(&current));
    let mut labels = vec![
        TextLabel::new(
            input.snapshot.city.to_uppercase(),
            CITY_POS,
            FontKind::BoldCondensed,
            72.0,
            heading,
            Anchor::LeftMiddle,
        ),
        TextLabel::new(
            input.snapshot.temperature.to_string(),
            TEMPERATURE_POS,
            FontKind::Bold,
            130.0,
            heading,
            Anchor::RightMiddle,
        ),
        TextLabel::new(
            subtitle(input.snapshot, input.mode),
            SUBTITLE_POS,
            FontKind::Condensed,
            64.0,
            heading,
            Anchor::LeftMiddle,
        ),
    ];

    for (i, (sample, condition)) in slots.iter().enumerate() {
        let colour = style.slot_colours[i];
        let icon = assets.icon(condition.icon, IconSize::Small)?;
        let x = i64::from(SLOT_CENTRES_X[i]) - i64::from(icon.width() / 2);
        if style.recolor_icons {
            let tinted = recolor(icon, ICON_BASE_COLOUR, colour);
            imageops::overlay(&mut canvas, &tinted, x, SLOT_ICON_Y);
        } else {
            imageops::overlay(&mut canvas, icon, x, SLOT_ICON_Y);
        }

        labels.push(TextLabel::new(
            sample.temperature.to_string(),
            (SLOT_CENTRES_X[i], SLOT_TEMPERATURE_Y),
            FontKind::Condensed,
            48.0,
            opaque(colour),
            Anchor::CentreMiddle,
        ));
    }

    if !slots.is_empty() {
        let x = TIMELINE_X + i64::from(input.progress);
        imageops::overlay(&mut canvas, assets.marker(), x, MARKER_Y);
    }

    for label in &labels {
        label.draw(&mut canvas, assets.font(label.font)?);
    }

    tracing::debug!(
        mode = %input.mode,
        icon = current.icon.file_stem(),
        accent = %current.accent_hex(),
        "weather card composed"
    );
    encode(&canvas)
}

/// Simple cards show the observation time on a 12-hour clock, as wttr.in
/// reports it. Hourly cards use 24-hour time plus the date when known.
fn subtitle(snapshot: &WeatherSnapshot, mode: CardMode) -> String {
    if mode == CardMode::Simple {
        return snapshot.local_time.format("%I:%M %p").to_string();
    }
    let time = snapshot.local_time.format("%H:%M");
    match snapshot.local_date {
        Some(date) => format!("{time}  {}", date.format("%A, %B %-d")),
        None => time.to_string(),
    }
}

fn opaque(colour: Rgb<u8>) -> Rgba<u8> {
    let [r, g, b] = colour.0;
    Rgba([r, g, b, 255])
}

fn encode(canvas: &RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    canvas.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        assets::test_support::{CANVAS, bundle, shipped_dir},
        daytime::daily_progress,
        model::{ConditionCode, Temperature},
    };
    use chrono::{NaiveDate, NaiveTime};

    const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn code(s: &str) -> ConditionCode {
        ConditionCode::parse(s).expect("valid code")
    }

    fn los_angeles() -> WeatherSnapshot {
        WeatherSnapshot {
            city: "Los Angeles".to_string(),
            temperature: Temperature(21),
            condition: code("116"),
            local_time: NaiveTime::from_hms_opt(14, 30, 0).expect("valid time"),
            local_date: NaiveDate::from_ymd_opt(2021, 8, 13),
            is_night: false,
        }
    }

    fn forecast() -> HourlyForecast {
        HourlyForecast::new([
            (Temperature(19), code("113")),
            (Temperature(22), code("116")),
            (Temperature(24), code("119")),
            (Temperature(21), code("176")),
            (Temperature(18), code("143")),
            (Temperature(16), code("113")),
        ])
    }

    fn decode(bytes: &[u8]) -> RgbaImage {
        image::load_from_memory(bytes).expect("valid png").to_rgba8()
    }

    #[test]
    fn style_table_covers_every_mode() {
        for &mode in CardMode::all() {
            let expected = match mode {
                CardMode::Simple => Template::Simple,
                CardMode::HourlyLight => Template::HourlyLight,
                CardMode::HourlyDark => Template::HourlyDark,
            };
            assert_eq!(style(mode).template, expected);
        }
        assert!(style(CardMode::HourlyDark).recolor_icons);
        assert!(!style(CardMode::HourlyLight).recolor_icons);
    }

    #[test]
    fn mode_parses_from_str() {
        assert_eq!("dark".parse::<CardMode>(), Ok(CardMode::HourlyDark));
        assert_eq!("Hourly".parse::<CardMode>(), Ok(CardMode::HourlyLight));
        assert!("sepia".parse::<CardMode>().is_err());
    }

    #[test]
    fn los_angeles_simple_card_is_a_png_of_template_size() {
        let assets = bundle();
        let snapshot = los_angeles();
        let input = CardInput {
            snapshot: &snapshot,
            hourly: None,
            progress: daily_progress(snapshot.local_time),
            mode: CardMode::Simple,
        };

        let bytes = compose(&assets, &input).expect("card composes");

        assert_eq!(bytes[..8], PNG_MAGIC);
        let img = decode(&bytes);
        assert_eq!(img.dimensions(), CANVAS);

        // some ink landed in the city label row
        let inked = (100..400).any(|x| img.get_pixel(x, 148).0 != [255, 255, 255, 255]);
        assert!(inked, "city label was not drawn");
    }

    #[test]
    fn hourly_cards_compose_in_both_styles() {
        let assets = bundle();
        let snapshot = los_angeles();
        let hourly = forecast();

        for mode in [CardMode::HourlyLight, CardMode::HourlyDark] {
            let input =
                CardInput { snapshot: &snapshot, hourly: Some(&hourly), progress: 400, mode };
            let bytes = compose(&assets, &input).expect("card composes");
            assert_eq!(bytes[..8], PNG_MAGIC);
            assert_eq!(decode(&bytes).dimensions(), CANVAS);
        }
    }

    #[test]
    fn dark_mode_tints_slot_icons_and_places_marker() {
        let assets = bundle();
        let snapshot = los_angeles();
        let hourly = forecast();
        let input = CardInput {
            snapshot: &snapshot,
            hourly: Some(&hourly),
            progress: 400,
            mode: CardMode::HourlyDark,
        };

        let img = decode(&compose(&assets, &input).expect("card composes"));

        for (i, centre) in SLOT_CENTRES_X.iter().enumerate() {
            // left half of the test icon is drawn in the base colour
            let x = (*centre - 64 + 10) as u32;
            let [r, g, b] = DARK_SLOTS[i].0;
            let px = img.get_pixel(x, SLOT_ICON_Y as u32 + 10);
            assert_eq!(px, &Rgba([r, g, b, 255]), "slot {i}");
        }

        let marker_x = (TIMELINE_X + 400 + 5) as u32;
        assert_eq!(img.get_pixel(marker_x, MARKER_Y as u32 + 5), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn light_mode_keeps_icon_palette() {
        let assets = bundle();
        let snapshot = los_angeles();
        let hourly = forecast();
        let input = CardInput {
            snapshot: &snapshot,
            hourly: Some(&hourly),
            progress: 0,
            mode: CardMode::HourlyLight,
        };

        let img = decode(&compose(&assets, &input).expect("card composes"));

        let px = img.get_pixel((SLOT_CENTRES_X[0] - 64 + 10) as u32, SLOT_ICON_Y as u32 + 10);
        let base = ICON_BASE_COLOUR.0;
        for c in 0..3 {
            assert!(px.0[c].abs_diff(base[c]) <= 1, "channel {c} changed: {px:?}");
        }
    }

    #[test]
    fn hourly_mode_without_forecast_fails() {
        let assets = bundle();
        let snapshot = los_angeles();
        let input = CardInput {
            snapshot: &snapshot,
            hourly: None,
            progress: 0,
            mode: CardMode::HourlyDark,
        };

        let err = compose(&assets, &input).unwrap_err();

        assert!(matches!(err, WeatherError::MissingForecast(ref m) if m == "dark"));
    }

    #[test]
    fn unknown_condition_yields_no_card() {
        let assets = bundle();
        let mut snapshot = los_angeles();
        snapshot.condition = code("123");
        let input =
            CardInput { snapshot: &snapshot, hourly: None, progress: 0, mode: CardMode::Simple };

        let err = compose(&assets, &input).unwrap_err();

        assert!(matches!(err, WeatherError::UnknownCondition(_)));
    }

    #[test]
    fn hourly_subtitle_includes_date_when_known() {
        let mut snapshot = los_angeles();
        assert_eq!(subtitle(&snapshot, CardMode::HourlyLight), "14:30  Friday, August 13");

        snapshot.local_date = None;
        assert_eq!(subtitle(&snapshot, CardMode::HourlyDark), "14:30");
    }

    #[test]
    fn simple_subtitle_uses_twelve_hour_clock() {
        let mut snapshot = los_angeles();
        assert_eq!(subtitle(&snapshot, CardMode::Simple), "02:30 PM");

        snapshot.local_time = NaiveTime::from_hms_opt(4, 44, 0).expect("valid time");
        assert_eq!(subtitle(&snapshot, CardMode::Simple), "04:44 AM");
    }

    #[test]
    fn cards_compose_from_shipped_assets() {
        let assets = AssetBundle::load(&shipped_dir()).expect("shipped assets load");
        let snapshot = los_angeles();
        let hourly = forecast();

        for &mode in CardMode::all() {
            let input =
                CardInput { snapshot: &snapshot, hourly: Some(&hourly), progress: 299, mode };
            let img = decode(&compose(&assets, &input).expect("card composes"));
            assert_eq!(img.dimensions(), CANVAS, "{mode}");
        }

        let input = CardInput {
            snapshot: &snapshot,
            hourly: Some(&hourly),
            progress: 299,
            mode: CardMode::HourlyDark,
        };
        let img = decode(&compose(&assets, &input).expect("card composes"));
        let tint = DARK_SLOTS[0].0;
        let left = (SLOT_CENTRES_X[0] - 64) as u32;
        let top = SLOT_ICON_Y as u32;
        // blending onto the opaque template may be off by one per channel
        let tinted = (top..top + 128)
            .flat_map(|y| (left..left + 128).map(move |x| (x, y)))
            .any(|(x, y)| (0..3).all(|c| img.get_pixel(x, y).0[c].abs_diff(tint[c]) <= 1));
        assert!(tinted, "first slot icon is not tinted");
    }
}
