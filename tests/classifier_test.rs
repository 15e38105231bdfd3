use edgar_alerts::{Classifier, KeywordClassifier};

#[tokio::test]
async fn detects_keywords_case_insensitively() {
    let classifier = KeywordClassifier::new();

    let verdict = classifier
        .classify("The company invested in BLOCKCHAIN infrastructure.")
        .await
        .expect("keyword classification cannot fail");

    assert!(verdict.relevant);
    let summary = verdict.summary.expect("relevant verdicts carry a summary");
    assert!(summary.contains("blockchain") || summary.contains("Blockchain"));
}

#[tokio::test]
async fn does_not_match_substrings_inside_larger_words() {
    let classifier = KeywordClassifier::new();

    // "encrypted" contains no whole-word crypto keyword.
    let verdict = classifier
        .classify("All records are encrypted at rest.")
        .await
        .expect("keyword classification cannot fail");

    assert!(!verdict.relevant);
    assert!(verdict.summary.is_none());
}

#[tokio::test]
async fn clean_text_is_not_relevant() {
    let classifier = KeywordClassifier::new();

    let verdict = classifier
        .classify("This document discusses our financial performance.")
        .await
        .expect("keyword classification cannot fail");

    assert!(!verdict.relevant);
    assert!(verdict.summary.is_none());
}

#[tokio::test]
async fn summary_lists_detected_keywords_and_a_snippet() {
    let classifier = KeywordClassifier::new();
    let text = "We hold Bitcoin on our balance sheet.\nOur Ethereum stake grew.\nUnrelated line.";

    let verdict = classifier
        .classify(text)
        .await
        .expect("keyword classification cannot fail");

    assert!(verdict.relevant);
    let summary = verdict.summary.expect("relevant verdicts carry a summary");
    assert!(summary.contains("Bitcoin"));
    assert!(summary.contains("Ethereum"));
    assert!(
        summary.contains("balance sheet"),
        "snippet should quote the matching line"
    );
}

#[tokio::test]
async fn snippet_lines_are_stripped_of_html() {
    let classifier = KeywordClassifier::new();
    let text = "<div>Exposure to <b>stablecoin</b> reserves</div>";

    let verdict = classifier
        .classify(text)
        .await
        .expect("keyword classification cannot fail");

    assert!(verdict.relevant);
    let summary = verdict.summary.expect("relevant verdicts carry a summary");
    assert!(!summary.contains("<div>"), "tags must not leak into the summary");
    assert!(summary.contains("stablecoin reserves"));
}

#[tokio::test]
async fn custom_keyword_lists_are_honored() {
    let classifier = KeywordClassifier::with_keywords(&["tungsten"]);

    let hit = classifier
        .classify("Quarterly tungsten shipments doubled.")
        .await
        .expect("keyword classification cannot fail");
    assert!(hit.relevant);

    let miss = classifier
        .classify("We hold Bitcoin on our balance sheet.")
        .await
        .expect("keyword classification cannot fail");
    assert!(!miss.relevant, "default keywords are replaced, not extended");
}
