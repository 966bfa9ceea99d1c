use super::*;

#[test]
fn short_text_is_one_chunk() {
    assert_eq!(split_chunks("안녕. 반가워", 100), vec!["안녕. 반가워"]);
}

#[test]
fn empty_and_blank_text_yield_no_chunks() {
    assert!(split_chunks("", 100).is_empty());
    assert!(split_chunks("   \n ", 100).is_empty());
}

#[test]
fn chunks_respect_limit_and_preserve_words() {
    let text = "alpha beta gamma delta epsilon zeta eta theta iota kappa";
    let chunks = split_chunks(text, 16);
    assert!(chunks.iter().all(|c| c.chars().count() <= 16), "{chunks:?}");
    assert_eq!(chunks.join(" "), text);
}

#[test]
fn breaks_after_punctuation() {
    let chunks = split_chunks("하나,둘,셋", 4);
    assert_eq!(chunks, vec!["하나,", "둘,셋"]);
}

#[test]
fn unbreakable_runs_are_cut_hard() {
    let text = "가".repeat(250);
    let chunks = split_chunks(&text, 100);
    assert_eq!(
        chunks.iter().map(|c| c.chars().count()).collect::<Vec<_>>(),
        vec![100, 100, 50]
    );
}
