//! VIC-II palettes and the catalog used to pick one for a source image.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use log::{debug, info, warn};
use serde::Deserialize;

use crate::{Result, VicError};

/// Number of colors the VIC-II can display.
pub const PALETTE_SIZE: usize = 16;

/// Name of the palette used when a lookup misses.
pub const DEFAULT_PALETTE: &str = "colodore";

// Hardware color indices.
pub const BLACK: u8 = 0;
pub const WHITE: u8 = 1;
pub const RED: u8 = 2;
pub const CYAN: u8 = 3;
pub const PURPLE: u8 = 4;
pub const GREEN: u8 = 5;
pub const BLUE: u8 = 6;
pub const YELLOW: u8 = 7;
pub const ORANGE: u8 = 8;
pub const BROWN: u8 = 9;
pub const LIGHT_RED: u8 = 10;
pub const DARK_GREY: u8 = 11;
pub const MEDIUM_GREY: u8 = 12;
pub const LIGHT_GREEN: u8 = 13;
pub const LIGHT_BLUE: u8 = 14;
pub const LIGHT_GREY: u8 = 15;

const BUILTIN_PALETTES: [(&str, &str); 5] = [
    (
        "colodore",
        "000000:ffffff:813338:75cec8:8e3c97:56ac4d:2e2c9b:edf171:8e5029:553800:c46c71:4a4a4a:7b7b7b:a9ff9f:706deb:b2b2b2",
    ),
    (
        "levy",
        "040204:fcfefc:cc3634:84f2dc:cc5ac4:5cce34:4436cc:f4ee5c:d47e34:945e34:fc9a94:5c5a5c:8c8e8c:9cfe9c:74a2ec:c4c2c4",
    ),
    (
        "pepto",
        "000000:ffffff:68372b:70a4b2:6f3d86:588d43:352879:b8c76f:6f4f25:433900:9a6759:444444:6c6c6c:9ad284:6c5eb5:959595",
    ),
    (
        "vice",
        "000000:fdfefc:be1a24:30e6c6:b41ae2:1fd21e:211bae:dff60a:b84104:6a3304:fe4a57:424540:70746f:59fe59:5f53fe:a4a7a2",
    ),
    (
        "vice-old",
        "000000:d5d5d5:72352c:659fa6:733a91:568d35:2e237d:aeb75e:774f1e:4b3c00:9c635a:474747:6b6b6b:8fc271:675db6:8f8f8f",
    ),
];

/// An opaque RGB color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses a six digit hex value such as `6c5eb5`.
    pub fn parse_hex(value: &str) -> Result<Self> {
        let value = value.trim();
        if value.len() != 6 || !value.is_ascii() {
            return Err(VicError::InvalidPalette(format!(
                "'{value}' is not a six digit hex color"
            )));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&value[range], 16).map_err(|_| {
                VicError::InvalidPalette(format!("'{value}' is not a six digit hex color"))
            })
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// A named set of the 16 VIC-II colors, indexed by hardware color number.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    name: String,
    colors: [Rgb; PALETTE_SIZE],
}

impl Palette {
    pub fn new(name: impl Into<String>, colors: [Rgb; PALETTE_SIZE]) -> Self {
        Self {
            name: name.into(),
            colors,
        }
    }

    /// Parses 16 hex colors separated by `:` or `,`.
    pub fn parse(name: impl Into<String>, values: &str) -> Result<Self> {
        let name = name.into();
        let parsed = values
            .split([':', ','])
            .map(Rgb::parse_hex)
            .collect::<Result<Vec<_>>>()?;
        let colors: [Rgb; PALETTE_SIZE] = parsed.try_into().map_err(|v: Vec<Rgb>| {
            VicError::InvalidPalette(format!(
                "palette '{name}' has {} colors, expected {PALETTE_SIZE}",
                v.len()
            ))
        })?;
        Ok(Self { name, colors })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn colors(&self) -> &[Rgb; PALETTE_SIZE] {
        &self.colors
    }

    /// Color for a hardware color number; only the low nibble is used.
    #[inline]
    pub fn color(&self, index: u8) -> Rgb {
        self.colors[(index & 0x0F) as usize]
    }

    /// Counts the candidate colors that appear somewhere in this palette.
    pub fn score(&self, candidates: &[Rgb]) -> usize {
        candidates
            .iter()
            .map(|c| self.colors.iter().filter(|&p| p == c).count())
            .sum()
    }

    /// The colors as `RRGGBB` strings, in hardware order.
    pub fn hex_strings(&self) -> Vec<String> {
        self.colors.iter().map(Rgb::to_string).collect()
    }
}

/// Builds the table that turns source palette indices into hardware color numbers.
///
/// For every slot of `target`, the position of an identical color in `source` is mapped
/// to that slot. Source indices without a match stay 0. The table has at least 16
/// entries so that any 4-bit index can be looked up.
pub fn remap_indices(source: &[Rgb], target: &Palette) -> Vec<u8> {
    let mut table = vec![0u8; source.len().max(PALETTE_SIZE)];
    for (slot, color) in target.colors().iter().enumerate() {
        if let Some(i) = source.iter().rposition(|c| c == color) {
            table[i] = slot as u8;
        }
    }
    table
}

#[derive(Debug, Deserialize)]
#[serde(transparent)]
struct PaletteConfig(BTreeMap<String, String>);

/// Named palettes, iterated in name order.
#[derive(Clone, Debug)]
pub struct PaletteCatalog {
    palettes: BTreeMap<String, Palette>,
    fallback: Palette,
}

impl Default for PaletteCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PaletteCatalog {
    /// The five palettes shipped with the crate.
    pub fn builtin() -> Self {
        let palettes: BTreeMap<String, Palette> = BUILTIN_PALETTES
            .iter()
            .filter_map(|(name, values)| Palette::parse(*name, values).ok())
            .map(|p| (p.name().to_string(), p))
            .collect();
        let fallback = palettes
            .get(DEFAULT_PALETTE)
            .cloned()
            .unwrap_or_else(|| Palette::new(DEFAULT_PALETTE, [Rgb::default(); PALETTE_SIZE]));
        Self { palettes, fallback }
    }

    /// Adds or replaces a palette, returning the one it replaced.
    pub fn insert(&mut self, palette: Palette) -> Option<Palette> {
        if palette.name() == DEFAULT_PALETTE {
            self.fallback = palette.clone();
        }
        self.palettes.insert(palette.name().to_string(), palette)
    }

    pub fn get(&self, name: &str) -> Option<&Palette> {
        self.palettes.get(name)
    }

    /// Looks up a palette, falling back to the default palette on a miss.
    pub fn by_name(&self, name: &str) -> &Palette {
        match self.palettes.get(name) {
            Some(palette) => palette,
            None => {
                warn!(
                    "Invalid palette name {name:?}, defaulting to {:?}",
                    self.fallback.name()
                );
                &self.fallback
            }
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.palettes.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Palette> {
        self.palettes.values()
    }

    pub fn len(&self) -> usize {
        self.palettes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.palettes.is_empty()
    }

    /// Picks the palette containing the most of the given colors.
    ///
    /// Palettes are scored in name order and a later palette only wins with a strictly
    /// higher score, so ties go to the first name.
    pub fn best_match(&self, candidates: &[Rgb]) -> &Palette {
        let mut best: Option<(&Palette, usize)> = None;
        for palette in self.palettes.values() {
            let score = palette.score(candidates);
            debug!("Palette {:?} scored {score}", palette.name());
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((palette, score)),
            }
        }
        match best {
            Some((palette, score)) => {
                info!("Palette {:?} won with a score of {score}", palette.name());
                palette
            }
            None => {
                warn!("Palette catalog is empty, using {:?}", self.fallback.name());
                &self.fallback
            }
        }
    }

    /// Merges palettes from JSON of the form `{"name": "RRGGBB:RRGGBB:..."}`.
    ///
    /// Returns the number of palettes added or replaced.
    pub fn load_json(&mut self, json: &str) -> Result<usize> {
        let config: PaletteConfig = serde_json::from_str(json)?;
        let count = config.0.len();
        for (name, values) in config.0 {
            self.insert(Palette::parse(name, &values)?);
        }
        Ok(count)
    }

    /// Reads a JSON palette file, see [`PaletteCatalog::load_json`].
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| VicError::io(path, e))?;
        let count = self.load_json(&json)?;
        info!("Loaded {count} palettes from {}", path.display());
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog() {
        let catalog = PaletteCatalog::builtin();
        assert_eq!(
            catalog.names().collect::<Vec<_>>(),
            vec!["colodore", "levy", "pepto", "vice", "vice-old"]
        );
        let pepto = catalog.by_name("pepto");
        assert_eq!(pepto.color(BLACK), Rgb::new(0, 0, 0));
        assert_eq!(pepto.color(WHITE), Rgb::new(0xff, 0xff, 0xff));
        assert_eq!(pepto.color(LIGHT_BLUE), Rgb::new(0x6c, 0x5e, 0xb5));
    }

    #[test]
    fn test_lookup_miss_falls_back() {
        let catalog = PaletteCatalog::builtin();
        assert!(catalog.get("nope").is_none());
        assert_eq!(catalog.by_name("nope").name(), DEFAULT_PALETTE);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(Palette::parse("short", "000000:ffffff").is_err());
        assert!(Rgb::parse_hex("12345").is_err());
        assert!(Rgb::parse_hex("zz0000").is_err());
        assert!(Rgb::parse_hex("ééé").is_err());
    }

    #[test]
    fn test_parse_accepts_commas() {
        let values = BUILTIN_PALETTES[2].1.replace(':', ",");
        let palette = Palette::parse("pepto2", &values).unwrap();
        assert_eq!(palette.colors(), PaletteCatalog::builtin().by_name("pepto").colors());
    }

    #[test]
    fn test_hex_strings() {
        let catalog = PaletteCatalog::builtin();
        let strings = catalog.by_name("pepto").hex_strings();
        assert_eq!(strings[0], "000000");
        assert_eq!(strings[2], "68372B");
    }

    #[test]
    fn test_best_match_picks_highest_score() {
        let catalog = PaletteCatalog::builtin();
        let vice = catalog.by_name("vice");
        let colors = vec![vice.color(RED), vice.color(CYAN), vice.color(BLACK)];
        assert_eq!(catalog.best_match(&colors).name(), "vice");
    }

    #[test]
    fn test_best_match_tie_goes_to_first_name() {
        let catalog = PaletteCatalog::builtin();
        // Black is shared by colodore, pepto, vice and vice-old
        let colors = vec![Rgb::new(0, 0, 0)];
        assert_eq!(catalog.best_match(&colors).name(), "colodore");
        for _ in 0..10 {
            assert_eq!(catalog.best_match(&colors).name(), "colodore");
        }
        // Nothing matches at all
        assert_eq!(catalog.best_match(&[Rgb::new(1, 2, 3)]).name(), "colodore");
    }

    #[test]
    fn test_remap_indices() {
        let catalog = PaletteCatalog::builtin();
        let pepto = catalog.by_name("pepto");
        let source = vec![pepto.color(WHITE), Rgb::new(9, 9, 9), pepto.color(BLUE)];
        let table = remap_indices(&source, pepto);
        assert_eq!(table.len(), PALETTE_SIZE);
        assert_eq!(table[0], WHITE);
        assert_eq!(table[1], 0);
        assert_eq!(table[2], BLUE);
    }

    #[test]
    fn test_load_json() {
        let mut catalog = PaletteCatalog::builtin();
        let json = format!(r#"{{"mine": "{}"}}"#, BUILTIN_PALETTES[1].1.replace(':', ","));
        assert_eq!(catalog.load_json(&json).unwrap(), 1);
        assert_eq!(catalog.len(), 6);
        assert_eq!(catalog.by_name("mine").colors(), catalog.by_name("levy").colors());

        assert!(matches!(
            catalog.load_json("not json"),
            Err(VicError::PaletteConfig(_))
        ));
        assert!(matches!(
            catalog.load_json(r#"{"bad": "000000"}"#),
            Err(VicError::InvalidPalette(_))
        ));
    }
}
