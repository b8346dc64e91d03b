//! # 변경 추적(track-changes) diff 렌더러
//!
//! 두 버전 내용을 단어 단위로 비교하여, 삭제된 부분은 `<del>`, 추가된 부분은 `<ins>`로
//! 감싼 HTML 조각을 만듭니다. 비교 화면의 "변경사항" 탭에 그대로 들어갑니다.
//!
//! 입력은 태그가 없는 텍스트여야 합니다. HTML 버전은
//! [`ContentKind::to_diff_text`](super::normalize::ContentKind::to_diff_text)로 먼저 텍스트로 바꿉니다.
//!
//! 단어 diff는 입력 크기의 제곱에 비례해 느려질 수 있으므로 항상 제한 시간을 둡니다.
//! 시간이 지나면 similar가 남은 구간을 통째로 "삭제 + 추가"로 처리하므로,
//! 결과가 덜 세밀해질 뿐 틀리지는 않습니다.

use super::normalize::escape_html;
use similar::{Algorithm, ChangeTag, TextDiff};
use std::time::Duration;

/// `DIFF_TIMEOUT_SECS`가 없을 때 쓰는 diff 제한 시간
pub const DEFAULT_DIFF_TIMEOUT: Duration = Duration::from_secs(5);

/// 두 내용 사이의 diff HTML을 생성합니다.
///
/// 같은 태그가 연속되면 하나의 `<ins>`/`<del>`로 묶어서 마크업이 잘게 쪼개지지 않게 합니다.
/// 줄바꿈은 `<br>`로 바꿉니다.
///
/// `timeout`: diff 계산에 쓸 수 있는 최대 시간
pub fn render_diff_html(original: &str, updated: &str, timeout: Duration) -> String {
    // Patience: 문서 구조(조항 제목 등 한 번만 나오는 단어)를 기준으로 먼저 정렬하고
    // 그 사이 구간만 Myers로 비교합니다.
    let diff = TextDiff::configure()
        .algorithm(Algorithm::Patience)
        .timeout(timeout)
        .diff_words(original, updated);

    let mut html = String::with_capacity(original.len().max(updated.len()) + 64);
    let mut open: Option<ChangeTag> = None;

    for change in diff.iter_all_changes() {
        let tag = change.tag();
        if open != Some(tag) {
            close_span(&mut html, open);
            match tag {
                ChangeTag::Delete => html.push_str("<del class=\"diff-removed\">"),
                ChangeTag::Insert => html.push_str("<ins class=\"diff-added\">"),
                ChangeTag::Equal => {}
            }
            open = Some(tag);
        }
        html.push_str(&escape_html(change.value()).replace('\n', "<br>"));
    }
    close_span(&mut html, open);

    html
}

fn close_span(html: &mut String, open: Option<ChangeTag>) {
    match open {
        Some(ChangeTag::Delete) => html.push_str("</del>"),
        Some(ChangeTag::Insert) => html.push_str("</ins>"),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::normalize::ContentKind;
    use std::time::Instant;

    const TIMEOUT: Duration = DEFAULT_DIFF_TIMEOUT;

    #[test]
    fn identical_texts_have_no_markers() {
        let html = render_diff_html("Purchase price is fixed.", "Purchase price is fixed.", TIMEOUT);
        assert_eq!(html, "Purchase price is fixed.");
    }

    #[test]
    fn replaced_words_are_marked() {
        let html = render_diff_html("price is 10 million", "price is 12 million", TIMEOUT);
        assert!(html.contains("<del class=\"diff-removed\">10</del>"));
        assert!(html.contains("<ins class=\"diff-added\">12</ins>"));
        assert!(html.starts_with("price is "));
        assert!(html.ends_with(" million"));
    }

    #[test]
    fn content_is_escaped() {
        let html = render_diff_html("a", "a <script>", TIMEOUT);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn empty_original_is_all_insertions() {
        let html = render_diff_html("", "New clause", TIMEOUT);
        assert_eq!(html, "<ins class=\"diff-added\">New clause</ins>");
    }

    #[test]
    fn html_versions_diff_as_text() {
        let v1 = ContentKind::detect("<p>Price is 10</p>");
        let v2 = ContentKind::detect("<p>Price is 12</p>");
        let html = render_diff_html(&v1.to_diff_text(), &v2.to_diff_text(), TIMEOUT);
        assert!(html.starts_with("Price is "));
        assert!(html.contains("<del class=\"diff-removed\">10</del>"));
        assert!(html.contains("<ins class=\"diff-added\">12</ins>"));
        assert!(!html.contains("&lt;p&gt;"));
    }

    #[test]
    fn large_disjoint_inputs_stop_at_the_deadline() {
        let original: Vec<String> = (0..20_000).map(|i| format!("alpha{i}")).collect();
        let updated: Vec<String> = (0..20_000).map(|i| format!("beta{i}")).collect();
        let (original, updated) = (original.join(" "), updated.join(" "));

        let started = Instant::now();
        let html = render_diff_html(&original, &updated, Duration::from_millis(200));
        assert!(started.elapsed() < Duration::from_secs(10), "took {:?}", started.elapsed());

        // 시간이 부족해도 양쪽 내용은 빠짐없이 표시됩니다.
        assert!(html.contains("diff-removed"));
        assert!(html.contains("diff-added"));
        assert!(html.contains("alpha0"));
        assert!(html.contains("alpha19999"));
        assert!(html.contains("beta19999"));
    }
}
