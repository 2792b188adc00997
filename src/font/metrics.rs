//! Advance widths for the standard PDF fonts, in 1/1000 em units, taken from
//! the Adobe Font Metrics files that ship with every PDF viewer.

/// Width table for one standard font face.
pub struct StandardFontMetrics {
    /// Widths for the printable ASCII range `' '..='~'`.
    ascii: &'static [u16; 95],
    /// Widths for the Latin-1 range `'\u{a0}'..='\u{ff}'`.
    latin1: &'static [u16; 96],
    /// Width used for characters outside the table.
    fallback: u16,
    /// Widths of the WinAnsi punctuation a report actually uses.
    bullet: u16,
    en_dash: u16,
    em_dash: u16,
    quote_single: u16,
    quote_double: u16,
    ellipsis: u16,
}

impl StandardFontMetrics {
    /// Advance width of one character in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        self.units(ch) as f64 * font_size / 1000.0
    }

    /// Width of a string in points, with `letter_spacing` added per character.
    pub fn measure_string(&self, text: &str, font_size: f64, letter_spacing: f64) -> f64 {
        text.chars()
            .map(|ch| self.char_width(ch, font_size) + letter_spacing)
            .sum()
    }

    fn units(&self, ch: char) -> u16 {
        match ch {
            ' '..='~' => self.ascii[ch as usize - 32],
            '\u{a0}'..='\u{ff}' => self.latin1[ch as usize - 0xa0],
            '\u{2022}' => self.bullet,
            '\u{2013}' => self.en_dash,
            '\u{2014}' => self.em_dash,
            '\u{2018}' | '\u{2019}' => self.quote_single,
            '\u{201c}' | '\u{201d}' => self.quote_double,
            '\u{2026}' => self.ellipsis,
            _ => self.fallback,
        }
    }
}

#[rustfmt::skip]
static HELVETICA_ASCII: [u16; 95] = [
    // space ! " # $ % & ' ( ) * + , - . /
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    // 0-9
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    // : ; < = > ? @
    278, 278, 584, 584, 584, 556, 1015,
    // A-Z
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    // [ \ ] ^ _ `
    278, 278, 278, 469, 556, 333,
    // a-z
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
    // { | } ~
    334, 260, 334, 584,
];

#[rustfmt::skip]
static HELVETICA_BOLD_ASCII: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

#[rustfmt::skip]
static HELVETICA_LATIN1: [u16; 96] = [
    // nbsp ¡ ¢ £ ¤ ¥ ¦ § ¨ © ª « ¬ shy ® ¯
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    // ° ± ² ³ ´ µ ¶ · ¸ ¹ º » ¼ ½ ¾ ¿
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    // À-Æ Ç È-Ë Ì-Ï
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    // Ð Ñ Ò-Ö × Ø Ù-Ü Ý Þ ß
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    // à-æ ç è-ë ì-ï
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278,
    // ð ñ ò-ö ÷ ø ù-ü ý þ ÿ
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500,
];

#[rustfmt::skip]
static HELVETICA_BOLD_LATIN1: [u16; 96] = [
    278, 333, 556, 556, 556, 556, 280, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    400, 584, 333, 333, 333, 611, 556, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    722, 722, 722, 722, 722, 722, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    556, 556, 556, 556, 556, 556, 889, 556, 556, 556, 556, 556, 278, 278, 278, 278,
    611, 611, 611, 611, 611, 611, 611, 584, 611, 611, 611, 611, 611, 556, 611, 556,
];

static COURIER_ASCII: [u16; 95] = [600; 95];
static COURIER_LATIN1: [u16; 96] = [600; 96];

pub static HELVETICA: StandardFontMetrics = StandardFontMetrics {
    ascii: &HELVETICA_ASCII,
    latin1: &HELVETICA_LATIN1,
    fallback: 556,
    bullet: 350,
    en_dash: 556,
    em_dash: 1000,
    quote_single: 222,
    quote_double: 333,
    ellipsis: 1000,
};

pub static HELVETICA_BOLD: StandardFontMetrics = StandardFontMetrics {
    ascii: &HELVETICA_BOLD_ASCII,
    latin1: &HELVETICA_BOLD_LATIN1,
    fallback: 611,
    bullet: 350,
    en_dash: 556,
    em_dash: 1000,
    quote_single: 278,
    quote_double: 500,
    ellipsis: 1000,
};

pub static COURIER: StandardFontMetrics = StandardFontMetrics {
    ascii: &COURIER_ASCII,
    latin1: &COURIER_LATIN1,
    fallback: 600,
    bullet: 600,
    en_dash: 600,
    em_dash: 600,
    quote_single: 600,
    quote_double: 600,
    ellipsis: 600,
};
