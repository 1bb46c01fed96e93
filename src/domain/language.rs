use whatlang::{Lang, detect};

/// Outcome of local language detection on a comment body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedLanguage {
    /// ISO 639-1 code of the best guess, e.g. "es".
    pub code: &'static str,
    /// Whether whatlang considers the guess reliable.
    pub reliable: bool,
}

/// Detects the language of `text`, keeping only the highest-confidence
/// guess. Returns `None` when detection fails or the detected language
/// has no two-letter code to compare against translation codes.
pub fn detect_language(text: &str) -> Option<DetectedLanguage> {
    let info = detect(text)?;
    let code = iso_639_1(info.lang())?;
    Some(DetectedLanguage {
        code,
        reliable: info.is_reliable(),
    })
}

/// Maps a `whatlang::Lang` to its ISO 639-1 code, which is what both the
/// translation service and the ticket language field use.
fn iso_639_1(lang: Lang) -> Option<&'static str> {
    Some(match lang {
        Lang::Afr => "af",
        Lang::Ara => "ar",
        Lang::Bul => "bg",
        Lang::Ben => "bn",
        Lang::Cat => "ca",
        Lang::Ces => "cs",
        Lang::Cmn => "zh",
        Lang::Dan => "da",
        Lang::Deu => "de",
        Lang::Ell => "el",
        Lang::Eng => "en",
        Lang::Spa => "es",
        Lang::Est => "et",
        Lang::Fin => "fi",
        Lang::Fra => "fr",
        Lang::Heb => "he",
        Lang::Hin => "hi",
        Lang::Hrv => "hr",
        Lang::Hun => "hu",
        Lang::Ind => "id",
        Lang::Ita => "it",
        Lang::Jpn => "ja",
        Lang::Kat => "ka",
        Lang::Kor => "ko",
        Lang::Lav => "lv",
        Lang::Lit => "lt",
        Lang::Mkd => "mk",
        Lang::Nld => "nl",
        Lang::Nob => "nb",
        Lang::Pol => "pl",
        Lang::Por => "pt",
        Lang::Ron => "ro",
        Lang::Rus => "ru",
        Lang::Slk => "sk",
        Lang::Slv => "sl",
        Lang::Swe => "sv",
        Lang::Tam => "ta",
        Lang::Tha => "th",
        Lang::Tur => "tr",
        Lang::Ukr => "uk",
        Lang::Urd => "ur",
        Lang::Vie => "vi",
        _ => return None,
    })
}
