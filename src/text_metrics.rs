//! Text measurement for node auto-sizing.
//!
//! Widths come from the first matching system font (via `fontdb`) and fall
//! back to a calibrated per-character table when no font is available or
//! `fast_metrics` is set. Results are memoised in a bounded cache keyed by the
//! text and every font parameter; clearing it never changes results.

use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use ttf_parser::Face;

/// Fallback advance for glyphs the font does not cover, as a share of the em.
const FALLBACK_CHAR_RATIO: f64 = 0.56;
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

static TEXT_MEASURER: Lazy<Mutex<TextMeasurer>> = Lazy::new(|| Mutex::new(TextMeasurer::new()));
static MEASURE_CACHE: Lazy<Mutex<MeasureCache>> =
    Lazy::new(|| Mutex::new(MeasureCache::new(DEFAULT_CACHE_CAPACITY)));

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FontConfig {
    /// CSS-style family list, e.g. `"Inter, system-ui, sans-serif"`.
    pub family: String,
    pub size: f64,
    pub weight: u16,
    pub line_height: f64,
    pub fast_metrics: bool,
}

impl FontConfig {
    pub fn new(size: f64) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    fn cache_key(&self, text: &str) -> CacheKey {
        CacheKey {
            text: text.to_string(),
            family: self.family.clone(),
            size_bits: self.size.to_bits(),
            weight: self.weight,
            line_height_bits: self.line_height.to_bits(),
            fast: self.fast_metrics,
        }
    }
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            family: "Inter, system-ui, -apple-system, sans-serif".to_string(),
            size: 14.0,
            weight: 400,
            line_height: 1.5,
            fast_metrics: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TextSize {
    pub width: f64,
    pub height: f64,
}

/// Measure a (possibly multi-line) label.
pub fn measure_text(text: &str, font: &FontConfig) -> TextSize {
    let key = font.cache_key(text);
    if let Ok(cache) = MEASURE_CACHE.lock()
        && let Some(hit) = cache.get(&key)
    {
        return hit;
    }

    let size = measure_uncached(text, font);
    if let Ok(mut cache) = MEASURE_CACHE.lock() {
        cache.insert(key, size);
    }
    size
}

fn measure_uncached(text: &str, font: &FontConfig) -> TextSize {
    if font.size <= 0.0 || !font.size.is_finite() {
        return TextSize::default();
    }
    let lines = split_lines(text);
    let width = lines
        .iter()
        .map(|line| text_width(line, font))
        .fold(0.0, f64::max);
    let height = lines.len().max(1) as f64 * font.size * font.line_height.max(0.0);
    TextSize { width, height }
}

/// Drop every memoised measurement.
pub fn clear_measure_cache() {
    if let Ok(mut cache) = MEASURE_CACHE.lock() {
        cache.clear();
    }
}

pub fn measure_cache_len() -> usize {
    MEASURE_CACHE.lock().map(|cache| cache.len()).unwrap_or(0)
}

/// Width of a single line.
pub fn text_width(text: &str, font: &FontConfig) -> f64 {
    if text.is_empty() || font.size <= 0.0 {
        return 0.0;
    }
    let normalized = text.replace('\t', "    ");
    if font.fast_metrics {
        return fallback_text_width(&normalized, font.size);
    }
    TEXT_MEASURER
        .lock()
        .ok()
        .and_then(|mut measurer| measurer.measure(&normalized, font))
        .unwrap_or_else(|| fallback_text_width(&normalized, font.size))
}

/// Greedy word wrap. Lines that already fit are returned unchanged; a single
/// word wider than `max_width` gets a line of its own.
pub fn wrap_text(text: &str, max_width: f64, font: &FontConfig) -> Vec<String> {
    let mut lines = Vec::new();
    for line in split_lines(text) {
        lines.extend(wrap_line(&line, max_width, font));
    }
    lines
}

fn wrap_line(line: &str, max_width: f64, font: &FontConfig) -> Vec<String> {
    if text_width(line, font) <= max_width {
        return vec![line.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in line.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if text_width(&candidate, font) > max_width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            current.push_str(word);
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

pub(crate) fn split_lines(text: &str) -> Vec<String> {
    text.replace("<br/>", "\n")
        .replace("<br>", "\n")
        .replace("\\n", "\n")
        .split('\n')
        .map(|line| line.trim().to_string())
        .collect()
}

fn fallback_text_width(text: &str, font_size: f64) -> f64 {
    text.chars()
        .filter(|ch| *ch != '\n')
        .map(char_width_factor)
        .sum::<f64>()
        * font_size
}

/// Em-relative advance widths for a typical UI sans-serif.
fn char_width_factor(ch: char) -> f64 {
    match ch {
        'i' | 'j' | 'l' => 0.24,
        'I' => 0.27,
        ' ' | 't' => 0.31,
        '.' | ',' | ':' | ';' | '|' | '!' | '(' | ')' | '[' | ']' | '{' | '}' | '\\' | '\'' => {
            0.32
        }
        'f' => 0.34,
        'r' => 0.36,
        '1' => 0.40,
        '-' | '_' | '/' | '"' => 0.42,
        'k' | 's' => 0.52,
        'v' | 'x' | 'a' | 'c' | 'e' | 'y' | 'z' => 0.55,
        'J' | 'L' | 'T' | '7' | 'F' => 0.57,
        'n' | 'u' | 'q' | 'p' | 'E' | '5' | '9' | '3' => 0.59,
        'b' | 'd' | 'g' | 'h' | 'o' | '0' | '2' | '4' | '6' | '8' => 0.60,
        'P' | 'S' | 'Z' => 0.63,
        'A' | 'B' | 'K' | 'R' | 'V' | 'X' | 'Y' => 0.65,
        'C' | 'D' | 'G' | 'H' | 'O' | 'Q' | 'U' => 0.74,
        'N' => 0.76,
        'w' => 0.81,
        'm' => 0.87,
        'M' => 0.90,
        '@' | '#' | '%' | '&' | 'W' => 0.95,
        _ => 0.57,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    text: String,
    family: String,
    size_bits: u64,
    weight: u16,
    line_height_bits: u64,
    fast: bool,
}

/// FIFO-bounded memo table.
struct MeasureCache {
    capacity: usize,
    entries: HashMap<CacheKey, TextSize>,
    order: VecDeque<CacheKey>,
}

impl MeasureCache {
    fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    fn get(&self, key: &CacheKey) -> Option<TextSize> {
        self.entries.get(key).copied()
    }

    fn insert(&mut self, key: CacheKey, value: TextSize) {
        if self.entries.insert(key.clone(), value).is_some() {
            return;
        }
        self.order.push_back(key);
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

struct TextMeasurer {
    db: Database,
    loaded_system_fonts: bool,
    faces: HashMap<(String, u16), Option<FontFace>>,
}

impl TextMeasurer {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            faces: HashMap::new(),
        }
    }

    fn measure(&mut self, text: &str, font: &FontConfig) -> Option<f64> {
        let key = (normalize_family_key(&font.family), font.weight);
        if !self.faces.contains_key(&key) {
            let face = self.load_face(&font.family, font.weight);
            if face.is_none() {
                tracing::debug!(
                    family = %key.0,
                    weight = key.1,
                    "no system font matched, using fallback widths"
                );
            }
            self.faces.insert(key.clone(), face);
        }
        let face = self.faces.get_mut(&key)?.as_mut()?;
        Some(face.measure_width(text, font.size))
    }

    fn load_face(&mut self, font_family: &str, weight: u16) -> Option<FontFace> {
        #[derive(Clone, Copy)]
        enum FamilyToken {
            Generic(Family<'static>),
            Name(usize),
        }

        let mut names: Vec<String> = Vec::new();
        let mut order: Vec<FamilyToken> = Vec::new();
        for part in font_family.split(',') {
            let raw = part.trim().trim_matches('"').trim_matches('\'');
            if raw.is_empty() {
                continue;
            }
            match raw.to_ascii_lowercase().as_str() {
                "serif" => order.push(FamilyToken::Generic(Family::Serif)),
                "sans-serif" | "system-ui" | "-apple-system" | "ui-sans-serif" => {
                    order.push(FamilyToken::Generic(Family::SansSerif))
                }
                "monospace" | "ui-monospace" => order.push(FamilyToken::Generic(Family::Monospace)),
                "cursive" => order.push(FamilyToken::Generic(Family::Cursive)),
                "fantasy" => order.push(FamilyToken::Generic(Family::Fantasy)),
                _ => {
                    order.push(FamilyToken::Name(names.len()));
                    names.push(raw.to_string());
                }
            }
        }
        if order.is_empty() {
            order.push(FamilyToken::Generic(Family::SansSerif));
        }

        let families: Vec<Family<'_>> = order
            .iter()
            .map(|token| match *token {
                FamilyToken::Generic(family) => family,
                FamilyToken::Name(idx) => Family::Name(names[idx].as_str()),
            })
            .collect();

        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
        }

        let query = Query {
            families: &families,
            weight: Weight(weight),
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        self.db
            .with_face_data(id, |data, index| FontFace::parse(data.to_vec(), index))
            .flatten()
    }
}

struct FontFace {
    data: Vec<u8>,
    index: u32,
    units_per_em: u16,
    ascii_advances: [u16; 128],
    char_advances: HashMap<char, Option<u16>>,
}

impl FontFace {
    fn parse(data: Vec<u8>, index: u32) -> Option<Self> {
        let face = Face::parse(&data, index).ok()?;
        let units_per_em = face.units_per_em().max(1);
        let mut ascii_advances = [0u16; 128];
        for byte in 0u8..=127 {
            if let Some(glyph) = face.glyph_index(byte as char) {
                ascii_advances[byte as usize] = face.glyph_hor_advance(glyph).unwrap_or(0);
            }
        }
        drop(face);
        Some(Self {
            data,
            index,
            units_per_em,
            ascii_advances,
            char_advances: HashMap::new(),
        })
    }

    fn measure_width(&mut self, text: &str, font_size: f64) -> f64 {
        let scale = font_size / self.units_per_em as f64;
        let fallback = font_size * FALLBACK_CHAR_RATIO;
        let mut width = 0.0;

        if text.is_ascii() {
            for byte in text.bytes() {
                if byte == b'\n' {
                    continue;
                }
                match self.ascii_advances[byte as usize] {
                    0 => width += fallback,
                    advance => width += advance as f64 * scale,
                }
            }
            return width;
        }

        let mut face: Option<Face<'_>> = None;
        for ch in text.chars() {
            if ch == '\n' {
                continue;
            }
            let advance = match self.char_advances.get(&ch) {
                Some(cached) => *cached,
                None => {
                    if face.is_none() {
                        face = Face::parse(&self.data, self.index).ok();
                    }
                    let value = face.as_ref().and_then(|parsed| {
                        parsed
                            .glyph_index(ch)
                            .and_then(|glyph| parsed.glyph_hor_advance(glyph))
                    });
                    self.char_advances.insert(ch, value);
                    value
                }
            };
            match advance {
                Some(advance) if advance > 0 => width += advance as f64 * scale,
                _ => width += fallback,
            }
        }
        width
    }
}

fn normalize_family_key(font_family: &str) -> String {
    let trimmed = font_family.trim();
    if trimmed.is_empty() {
        "sans-serif".to_string()
    } else {
        trimmed.to_string()
    }
}
