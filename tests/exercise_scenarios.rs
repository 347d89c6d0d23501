use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::SmallRng;
use regex::Regex;

use lingodrill::config::Config;
use lingodrill::engine::compare::{CharMatch, compare_char};
use lingodrill::engine::scoring::{NO_HELP_BONUS_XP, NO_MISTAKE_BONUS_XP, WORD_BASE_XP};
use lingodrill::engine::tokenizer::{Token, join, tokenize};
use lingodrill::exercise::cloze::ClozeRound;
use lingodrill::exercise::matching::{CardId, MatchingRound};
use lingodrill::exercise::standard::StandardRound;
use lingodrill::exercise::unit::{ClozeUnit, Lesson, MatchingPair, MatchingUnit, SentenceUnit};
use lingodrill::exercise::{ExerciseEvent, ExerciseInput, ExerciseListener, XpAward, dispatch};
use lingodrill::session::runner::SessionRunner;

#[derive(Default)]
struct Recorder {
    xp: Vec<u32>,
    mistakes: usize,
    rejected: Vec<String>,
    mismatches: usize,
    completions: usize,
}

impl ExerciseListener for Recorder {
    fn on_xp(&mut self, award: &XpAward) {
        self.xp.push(award.amount);
    }

    fn on_mistake(&mut self) {
        self.mistakes += 1;
    }

    fn on_option_rejected(&mut self, option: &str) {
        self.rejected.push(option.to_string());
    }

    fn on_mismatch(&mut self, _source: CardId, _target: CardId) {
        self.mismatches += 1;
    }

    fn on_unit_complete(&mut self) {
        self.completions += 1;
    }
}

fn later(now: Instant) -> Instant {
    now + Duration::from_secs(5)
}

fn sentence(target: &str) -> SentenceUnit {
    SentenceUnit {
        target: target.to_string(),
        source: String::new(),
        distractors: Vec::new(),
    }
}

fn type_word(round: &mut StandardRound, text: &str, now: Instant, rec: &mut Recorder) {
    for ch in text.chars() {
        dispatch(&round.type_letter(ch, now), rec);
    }
}

// --- sentence transcription ---

#[test]
fn clean_word_pays_base_and_both_bonuses() {
    let t0 = Instant::now();
    let mut rec = Recorder::default();
    let mut round = StandardRound::new(&Config::default());
    dispatch(&round.initialize(&sentence("Hi"), t0), &mut rec);

    type_word(&mut round, "Hi", t0, &mut rec);
    dispatch(&round.tick(later(t0)), &mut rec);

    assert_eq!(rec.xp, vec![WORD_BASE_XP + NO_MISTAKE_BONUS_XP + NO_HELP_BONUS_XP]);
    assert_eq!(rec.completions, 1);
}

#[test]
fn one_wrong_key_drops_only_the_mistake_bonus() {
    let t0 = Instant::now();
    let mut rec = Recorder::default();
    let mut round = StandardRound::new(&Config::default());
    round.initialize(&sentence("Hi"), t0);

    type_word(&mut round, "XHi", t0, &mut rec);
    dispatch(&round.tick(later(t0)), &mut rec);

    assert_eq!(rec.mistakes, 1);
    assert_eq!(rec.xp, vec![WORD_BASE_XP + NO_HELP_BONUS_XP]);
    assert_eq!(rec.completions, 1);
}

#[test]
fn reveal_drops_only_the_help_bonus() {
    let t0 = Instant::now();
    let mut rec = Recorder::default();
    let mut round = StandardRound::new(&Config::default());
    round.initialize(&sentence("Hi"), t0);

    dispatch(&round.reveal_letter(t0), &mut rec);
    type_word(&mut round, "i", t0, &mut rec);

    assert_eq!(rec.xp, vec![WORD_BASE_XP + NO_MISTAKE_BONUS_XP]);
}

#[test]
fn fully_revealed_word_pays_nothing() {
    let t0 = Instant::now();
    let mut rec = Recorder::default();
    let mut round = StandardRound::new(&Config::default());
    round.initialize(&sentence("Hi"), t0);

    dispatch(&round.reveal_letter(t0), &mut rec);
    dispatch(&round.reveal_letter(t0), &mut rec);
    dispatch(&round.tick(later(t0)), &mut rec);

    assert_eq!(rec.xp, vec![0]);
    assert_eq!(rec.completions, 1);
}

#[test]
fn punctuation_only_sentences_complete_on_initialize() {
    for text in ["", "?", "! ? .", "— „ ‟ (", "€ $ £", "***"] {
        let mut round = StandardRound::new(&Config::default());
        let events = round.initialize(&sentence(text), Instant::now());
        assert_eq!(events, vec![ExerciseEvent::UnitComplete], "text {text:?}");
        assert!(round.is_complete());
    }
}

#[test]
fn typing_into_finished_word_changes_nothing() {
    let t0 = Instant::now();
    let mut round = StandardRound::new(&Config::default());
    round.initialize(&sentence("Hi there"), t0);
    round.type_letter('H', t0);
    round.type_letter('i', t0);

    let before = round.current_word().map(|w| w.display());
    assert!(round.type_letter('x', t0).is_empty());
    assert_eq!(round.current_word().map(|w| w.display()), before);
}

#[test]
fn accented_target_accepts_accented_input_only_as_correct() {
    let t0 = Instant::now();
    let mut rec = Recorder::default();
    let mut round = StandardRound::new(&Config::default());
    round.initialize(&sentence("été"), t0);

    type_word(&mut round, "e", t0, &mut rec);
    assert_eq!(rec.mistakes, 1);

    // the diacritic-missing slot keeps the cursor, so the accented letter fixes it
    type_word(&mut round, "été", t0, &mut rec);
    dispatch(&round.tick(later(t0)), &mut rec);
    assert_eq!(rec.xp, vec![WORD_BASE_XP + NO_HELP_BONUS_XP]);
    assert_eq!(rec.completions, 1);
}

// --- cloze ---

#[test]
fn cloze_distractor_then_answer() {
    let t0 = Instant::now();
    let mut rec = Recorder::default();
    let mut rng = SmallRng::seed_from_u64(11);
    let mut round = ClozeRound::new(&Config::default());
    let unit = ClozeUnit {
        text: "The [cat] sat".to_string(),
        distractors: vec!["dog".to_string()],
    };
    dispatch(&round.initialize(&unit, &mut rng, t0), &mut rec);

    dispatch(&round.select_option("dog", t0), &mut rec);
    assert!(rec.xp.is_empty());
    assert_eq!(rec.rejected, vec!["dog".to_string()]);
    assert!(round.blanks()[0].user_answer.is_none());

    dispatch(&round.select_option("cat", t0), &mut rec);
    assert_eq!(rec.xp, vec![Config::default().xp.cloze_blank]);
    assert_eq!(rec.completions, 0);

    dispatch(&round.tick(later(t0)), &mut rec);
    assert_eq!(rec.completions, 1);
    assert_eq!(round.rendered(), "The [cat] sat");
}

#[test]
fn cloze_unterminated_bracket_degrades_to_completed_round() {
    let mut rng = SmallRng::seed_from_u64(1);
    let mut round = ClozeRound::new(&Config::default());
    let unit = ClozeUnit {
        text: "The [cat sat".to_string(),
        distractors: Vec::new(),
    };
    let events = round.initialize(&unit, &mut rng, Instant::now());
    assert_eq!(events, vec![ExerciseEvent::UnitComplete]);
    assert!(round.blanks().is_empty());
}

// --- matching ---

fn three_pairs() -> MatchingUnit {
    MatchingUnit {
        pairs: [("one", "un"), ("two", "deux"), ("three", "trois")]
            .iter()
            .map(|(s, t)| MatchingPair {
                source: s.to_string(),
                target: t.to_string(),
            })
            .collect(),
    }
}

fn play_matching(order: &[usize], wrong_first: bool, seed: u64) -> Recorder {
    let mut t = Instant::now();
    let mut rec = Recorder::default();
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut round = MatchingRound::new(&Config::default());
    dispatch(&round.initialize(&three_pairs(), &mut rng, t), &mut rec);

    for (step, &pair) in order.iter().enumerate() {
        // pair the source with a target that is still on the board
        let wrong = order.get(step + 1).copied().filter(|_| wrong_first);
        if let Some(wrong) = wrong {
            dispatch(&round.select_card(CardId(pair * 2), t), &mut rec);
            dispatch(&round.select_card(CardId(wrong * 2 + 1), t), &mut rec);
            t = later(t);
            dispatch(&round.tick(t), &mut rec);
        }
        dispatch(&round.select_card(CardId(pair * 2 + 1), t), &mut rec);
        dispatch(&round.select_card(CardId(pair * 2), t), &mut rec);
    }
    t = later(t);
    dispatch(&round.tick(t), &mut rec);
    dispatch(&round.tick(later(t)), &mut rec);
    rec
}

#[test]
fn matching_completes_once_regardless_of_order() {
    let pair_xp = Config::default().xp.matching_pair;
    for (seed, order) in [[0, 1, 2], [2, 0, 1], [1, 2, 0]].iter().enumerate() {
        for wrong_first in [false, true] {
            let rec = play_matching(order, wrong_first, seed as u64);
            assert_eq!(rec.xp, vec![pair_xp; 3]);
            assert_eq!(rec.completions, 1);
            assert_eq!(rec.mismatches, if wrong_first { 2 } else { 0 });
        }
    }
}

#[test]
fn selecting_matched_card_changes_nothing() {
    let t0 = Instant::now();
    let mut rng = SmallRng::seed_from_u64(9);
    let mut round = MatchingRound::new(&Config::default());
    round.initialize(&three_pairs(), &mut rng, t0);
    round.select_card(CardId(0), t0);
    round.select_card(CardId(1), t0);

    assert!(round.select_card(CardId(0), t0).is_empty());
    assert!(round.select_card(CardId(1), t0).is_empty());
    assert_eq!(round.selected_source(), None);
    assert_eq!(round.selected_target(), None);
    assert_eq!(round.matched_pairs(), 1);
}

// --- tokenizer and comparator properties ---

const SAMPLES: &[&str] = &[
    "Hi",
    "Je voudrais un café, s'il vous plaît.",
    "¿Dónde está la estación?",
    "Привет, как дела?",
    "l’homme — \"qui\" (parle) 3 langues: €5 $6 £7!",
    "  spaced   out   ",
    "it's O'Brien's 'quoted'",
];

fn reference_tokenize(text: &str) -> Vec<String> {
    let re = Regex::new(
        r#"[0-9A-Za-zÀ-ÖØ-öø-ɏЀ-ӿ]+(?:['’][0-9A-Za-zÀ-ÖØ-öø-ɏЀ-ӿ]+)*|[.,!?;:\-—"'„‟()\[\]{}€£$]"#,
    )
    .unwrap();
    re.find_iter(text).map(|m| m.as_str().to_string()).collect()
}

#[test]
fn tokenizer_agrees_with_reference_pattern() {
    for text in SAMPLES {
        let ours: Vec<String> = tokenize(text).iter().map(|t| t.to_string()).collect();
        assert_eq!(ours, reference_tokenize(text), "text {text:?}");
    }
}

#[test]
fn tokenizer_round_trips_through_join() {
    for text in SAMPLES {
        let tokens = tokenize(text);
        assert_eq!(tokenize(&join(&tokens)), tokens, "text {text:?}");
    }
}

#[test]
fn tokens_are_never_empty_or_padded() {
    for text in SAMPLES {
        for token in tokenize(text) {
            assert!(!token.as_str().is_empty());
            assert_eq!(token.as_str().trim(), token.as_str());
        }
    }
    assert_eq!(tokenize(""), Vec::<Token>::new());
}

#[test]
fn diacritic_equivalence_is_symmetric() {
    for (accented, base) in [('á', 'a'), ('è', 'e'), ('ü', 'u'), ('Ô', 'o'), ('ё', 'е')] {
        assert_eq!(compare_char(accented, base), CharMatch::DiacriticMissing);
        assert_eq!(compare_char(base, accented), CharMatch::DiacriticMissing);
        assert_eq!(compare_char(accented, accented), CharMatch::Correct);
    }
    assert_eq!(compare_char('á', 'à'), CharMatch::DiacriticMissing);
    assert_eq!(compare_char('a', 'b'), CharMatch::Incorrect);
}

// --- whole session ---

#[test]
fn demo_style_lesson_plays_to_the_end() {
    let json = r#"{
        "title": "Mini",
        "units": [
            {"kind": "sentence", "target": "Oui!", "source": "Yes!"},
            {"kind": "cloze", "text": "Un [chat]", "distractors": ["chien"]},
            {"kind": "matching", "pairs": [{"source": "cat", "target": "chat"}]}
        ]
    }"#;
    let lesson = Lesson::from_json(json).unwrap();
    let config = Config {
        shuffle_seed: Some(2),
        ..Config::default()
    };
    let mut t = Instant::now();
    let mut runner = SessionRunner::from_lesson(lesson, config, t);
    let mut rec = Recorder::default();
    dispatch(&runner.start(t), &mut rec);

    for ch in "Oui".chars() {
        dispatch(&runner.apply(ExerciseInput::Letter(ch), None, t), &mut rec);
    }
    t = later(t);
    dispatch(&runner.tick(t), &mut rec);
    t = later(t);
    dispatch(&runner.tick(t), &mut rec);

    dispatch(
        &runner.apply(ExerciseInput::SelectOption("chien".into()), None, t),
        &mut rec,
    );
    dispatch(
        &runner.apply(ExerciseInput::SelectOption("chat".into()), None, t),
        &mut rec,
    );
    t = later(t);
    dispatch(&runner.tick(t), &mut rec);
    t = later(t);
    dispatch(&runner.tick(t), &mut rec);

    dispatch(&runner.apply(ExerciseInput::SelectCard(CardId(0)), None, t), &mut rec);
    dispatch(&runner.apply(ExerciseInput::SelectCard(CardId(1)), None, t), &mut rec);
    t = later(t);
    dispatch(&runner.tick(t), &mut rec);
    t = later(t);
    dispatch(&runner.tick(t), &mut rec);

    let summary = runner.summary().expect("session finished");
    assert_eq!(rec.completions, 3);
    assert_eq!(summary.lesson, "Mini");
    assert_eq!(summary.total_units, 3);
    assert_eq!(summary.correct, 2);
    assert_eq!(summary.mistakes, 1);
    assert_eq!(summary.xp, 20 + 10 + 10);
}
