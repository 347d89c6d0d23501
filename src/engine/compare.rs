#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharMatch {
    Correct,
    DiacriticMissing,
    Incorrect,
}

/// Lowercase vowel with its diacritic removed. Only the fixed table below is
/// considered equivalent; everything else maps to itself.
fn base_vowel(ch: char) -> char {
    match ch {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' | 'ă' | 'ą' => 'a',
        'é' | 'è' | 'ê' | 'ë' | 'ě' | 'ę' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' | 'ő' => 'o',
        'ú' | 'ù' | 'û' | 'ü' | 'ů' | 'ű' => 'u',
        'ý' | 'ÿ' => 'y',
        'ё' => 'е',
        'ї' => 'і',
        'й' => 'и',
        _ => ch,
    }
}

fn fold_case(ch: char) -> char {
    let mut lower = ch.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(single), None) => single,
        _ => ch,
    }
}

/// Classify a typed character against the expected one.
pub fn compare_char(typed: char, target: char) -> CharMatch {
    let typed = fold_case(typed);
    let target = fold_case(target);
    if typed == target {
        CharMatch::Correct
    } else if base_vowel(typed) == base_vowel(target) {
        CharMatch::DiacriticMissing
    } else {
        CharMatch::Incorrect
    }
}
