// src/verdict.rs
use unicode_normalization::UnicodeNormalization;

pub const FALSE: &str = "false";
pub const TRUE: &str = "true";
pub const HALF_TRUE: &str = "half true";
pub const MOSTLY_FALSE: &str = "mostly false";
pub const MISLEADING: &str = "misleading";

/// Ordered substring rewrites: (pattern, replacement).
///
/// Every rule is tried in order against the running value and every match is
/// replaced, so a later rule sees the output of earlier ones. Multi-word and
/// scale phrases sit above the single-word synonyms they contain. Patterns
/// are lowercase NFC.
pub const VERDICT_RULES: &[(&str, &str)] = &[
    /* phrases and rating scales ------------------------------------------ */
    ("doğruluk payı vardır", HALF_TRUE),
    ("çok yanlış", FALSE),
    ("partialmente falso", MOSTLY_FALSE),
    ("misleading/partly false", MOSTLY_FALSE),
    ("false content/false", FALSE),
    ("false context/false", FALSE),
    ("delimično netačno", MOSTLY_FALSE),
    ("three pinocchios", MOSTLY_FALSE),
    ("four pinocchios", FALSE),
    ("pinocchio andante", FALSE),
    ("pants on fire", FALSE),
    ("c'eri quasi", HALF_TRUE),
    ("notizia falsa", FALSE),
    ("notizia false", FALSE),
    ("notizia vera", TRUE),
    ("correct attribution", TRUE),
    ("c'est faux", FALSE),
    ("es falso", FALSE),
    ("es false", FALSE),
    ("falso!", FALSE),
    ("mostly true", HALF_TRUE),
    /* latin-script single words ------------------------------------------ */
    ("incorrecto", FALSE),
    ("incorrect", FALSE),
    ("correct", TRUE),
    ("engañoso", MOSTLY_FALSE),
    ("enganoso", FALSE),
    ("enganador", MOSTLY_FALSE),
    ("misleidend", MISLEADING),
    ("trompeur", FALSE),
    ("verdadero", TRUE),
    ("cierto", TRUE),
    ("vera", TRUE),
    ("vero", TRUE),
    ("falsch", FALSE),
    ("falskt", FALSE),
    ("falsz", FALSE),
    ("fałsz", FALSE),
    ("falsa", FALSE),
    ("falso", FALSE),
    // "fals" also rewrites an already canonical "false"; the next rule undoes it.
    ("fals", FALSE),
    ("falsee", FALSE),
    ("fake", FALSE),
    ("faux", FALSE),
    ("errado", FALSE),
    ("scam", FALSE),
    ("yanlış", FALSE),
    ("epätosi", FALSE),
    ("doğru", TRUE),
    ("dogru", TRUE),
    /* cyrillic ------------------------------------------------------------ */
    ("неверно", FALSE),
    ("неправильно", FALSE),
    ("правильно", TRUE),
    ("помилковий", FALSE),
    ("невірно", FALSE),
    ("вірно", TRUE),
    /* bengali, arabic, persian -------------------------------------------- */
    ("মিথ্যা", FALSE),
    ("অসত্য", FALSE),
    ("مضلل", FALSE),
    ("نادرست", FALSE),
    ("زائف", FALSE),
    /* cjk ------------------------------------------------------------------ */
    ("部分錯誤", FALSE),
    ("錯誤的", FALSE),
    ("錯誤な", FALSE),
    ("錯誤", FALSE),
    ("正確的", TRUE),
    ("正しい", TRUE),
];

/// Canonicalize a raw verdict label.
///
/// NFC-compose, trim, strip trailing periods, lowercase, then run
/// [`VERDICT_RULES`] in order. Strings no rule touches come back in their
/// cleaned (trimmed, lowercased) form.
pub fn normalize_verdict(raw: &str) -> String {
    let composed: String = raw.nfc().collect();
    let mut v = composed
        .trim_start()
        .trim_end_matches(|c: char| c == '.' || c.is_whitespace())
        .to_lowercase();

    for &(pattern, replacement) in VERDICT_RULES {
        if v.contains(pattern) {
            v = v.replace(pattern, replacement);
        }
    }
    v
}
