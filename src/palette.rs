//! Palettes and the session palette state
//!
//! Palette-indexed surfaces resolve their pixels through a 256-entry table
//! of VGA-style RGB triples (6 bits per component). [`PaletteManager`] owns
//! the table that is current for the session and converts it to the 8-bit
//! native representation that surfaces attach before composition.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Number of entries in a palette.
pub const PALETTE_COUNT: usize = 256;

/// A 256-entry palette of VGA RGB triples, 6 bits per component (0-63).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    entries: Vec<[u8; 3]>,
}

impl Palette {
    /// Create an all-black palette.
    pub fn new() -> Self {
        Self {
            entries: vec![[0, 0, 0]; PALETTE_COUNT],
        }
    }

    /// Read one entry.
    #[inline]
    pub fn entry(&self, index: u8) -> [u8; 3] {
        self.entries[index as usize]
    }

    /// Set one entry. Components are clamped to the 6-bit VGA range.
    pub fn set_entry(&mut self, index: u8, r: u8, g: u8, b: u8) {
        self.entries[index as usize] = [r.min(63), g.min(63), b.min(63)];
    }

    /// Save the palette to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), String> {
        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        fs::write(path, json).map_err(|e| e.to_string())
    }

    /// Load a palette from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, String> {
        let json = fs::read_to_string(path).map_err(|e| e.to_string())?;
        let pal: Self = serde_json::from_str(&json).map_err(|e| e.to_string())?;
        if pal.entries.len() != PALETTE_COUNT {
            return Err(format!(
                "palette has {} entries, expected {}",
                pal.entries.len(),
                PALETTE_COUNT
            ));
        }
        Ok(pal)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new()
    }
}

/// A palette converted to native 8-bit RGB storage, stamped with the
/// epoch of the session palette it was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativePalette {
    pub epoch: u64,
    rgb: Vec<u8>,
}

impl NativePalette {
    /// Look up one entry as 8-bit RGB.
    #[inline]
    pub fn rgb(&self, index: u8) -> (u8, u8, u8) {
        let i = index as usize * 3;
        (self.rgb[i], self.rgb[i + 1], self.rgb[i + 2])
    }
}

/// Session-wide palette state.
///
/// Owns the current palette and a monotonically increasing epoch. Surfaces
/// attach the converted palette lazily and use the epoch to decide whether
/// a previously attached copy is still current.
#[derive(Debug, Clone)]
pub struct PaletteManager {
    current: Palette,
    epoch: u64,
    color_conversion: u32,
}

impl PaletteManager {
    pub fn new() -> Self {
        Self {
            current: Palette::new(),
            epoch: 0,
            color_conversion: 0,
        }
    }

    /// Install a new current palette, starting a new epoch.
    pub fn set_current(&mut self, palette: Palette) {
        self.current = palette;
        self.epoch += 1;
    }

    #[inline]
    pub fn current(&self) -> &Palette {
        &self.current
    }

    #[inline]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Set the color conversion mode flags used when importing artwork.
    pub fn set_color_conversion(&mut self, mode: u32) {
        self.color_conversion = mode;
    }

    pub fn color_conversion(&self) -> u32 {
        self.color_conversion
    }

    /// Convert the current palette to native 8-bit storage.
    ///
    /// VGA components are expanded from 6 to 8 bits by shifting and
    /// replicating the top bits, so 0 maps to 0 and 63 maps to 255.
    pub fn to_native(&self) -> NativePalette {
        let mut rgb = Vec::with_capacity(PALETTE_COUNT * 3);
        for entry in &self.current.entries {
            for &c in entry {
                rgb.push((c << 2) | (c >> 4));
            }
        }
        NativePalette {
            epoch: self.epoch,
            rgb,
        }
    }
}

impl Default for PaletteManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vga_expansion_covers_full_range() {
        let mut pal = Palette::new();
        pal.set_entry(1, 63, 0, 32);
        let mut mgr = PaletteManager::new();
        mgr.set_current(pal);
        let native = mgr.to_native();
        assert_eq!(native.rgb(0), (0, 0, 0));
        assert_eq!(native.rgb(1), (255, 0, 130));
    }

    #[test]
    fn test_set_entry_clamps_to_vga_range() {
        let mut pal = Palette::new();
        pal.set_entry(5, 200, 64, 63);
        assert_eq!(pal.entry(5), [63, 63, 63]);
    }

    #[test]
    fn test_epoch_advances_per_palette() {
        let mut mgr = PaletteManager::new();
        assert_eq!(mgr.epoch(), 0);
        mgr.set_current(Palette::new());
        mgr.set_current(Palette::new());
        assert_eq!(mgr.epoch(), 2);
        assert_eq!(mgr.to_native().epoch, 2);
    }

    #[test]
    fn test_save_load_round_trip() {
        let mut pal = Palette::new();
        pal.set_entry(7, 10, 20, 30);
        let path = std::env::temp_dir().join("retroblit_palette_test.json");
        pal.save(&path).unwrap();
        let loaded = Palette::load(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, pal);
    }
}
