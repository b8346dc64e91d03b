//! # 버전 내용 정규화(normalization) 서비스
//!
//! 버전 내용은 이미 HTML일 수도 있고, 가벼운 강조 표기(`**굵게**`, `*기울임*`)가 섞인
//! 평문일 수도 있습니다. 비교 화면의 세 탭(변경사항/원본/새 버전)이 같은 방식으로
//! 렌더링할 수 있도록 HTML로 맞춰 줍니다.
//!
//! 형식 판별은 업로드 시점에 [`ContentKind::detect`]로 한 번만 수행하고,
//! 결과([`ContentFormat`])를 DB에 저장합니다. 렌더링할 때는 저장된 형식을 그대로 씁니다.

use crate::models::ContentFormat;
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

// LazyLock: 처음 사용할 때 한 번만 정규식을 컴파일합니다.
static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<(p|div|span|h[1-6])(\s[^>]*)?>").expect("valid html tag regex")
});
static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{2,}").expect("valid paragraph regex"));
static BLOCK_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</(p|div|h[1-6]|li|tr|table|ul|ol)\s*>").expect("valid block regex")
});
static ANY_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));
static BOLD_STARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("valid bold regex"));
static BOLD_UNDERSCORES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"__(.*?)__").expect("valid bold regex"));
static ITALIC_STAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*(.*?)\*").expect("valid italic regex"));
static ITALIC_UNDERSCORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_(.*?)_").expect("valid italic regex"));
static UNDERLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"~(.*?)~").expect("valid underline regex"));

/// 형식이 확정된 버전 내용
///
/// DB에는 형식([`ContentFormat`])과 내용이 따로 저장되지만, 코드 안에서는
/// 항상 이 타입으로 묶어서 다룹니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentKind {
    Html(String),
    PlainText(String),
}

impl ContentKind {
    /// 내용 형식을 판별합니다. 업로드처럼 내용이 처음 들어오는 경계에서만 호출합니다.
    ///
    /// `<p>`, `<div>`, `<span>`, `<h1>`~`<h6>` 태그가 있으면 HTML입니다.
    pub fn detect(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        if HTML_TAG.is_match(&raw) {
            ContentKind::Html(raw)
        } else {
            ContentKind::PlainText(raw)
        }
    }

    /// 저장된 형식과 내용으로 ContentKind를 만듭니다 (다시 판별하지 않음).
    pub fn from_stored(format: ContentFormat, content: String) -> Self {
        match format {
            ContentFormat::Html => ContentKind::Html(content),
            ContentFormat::PlainText => ContentKind::PlainText(content),
        }
    }

    /// DB에 저장할 형식 값
    pub fn format(&self) -> ContentFormat {
        match self {
            ContentKind::Html(_) => ContentFormat::Html,
            ContentKind::PlainText(_) => ContentFormat::PlainText,
        }
    }

    /// 원본 내용 그대로
    pub fn as_str(&self) -> &str {
        match self {
            ContentKind::Html(content) | ContentKind::PlainText(content) => content,
        }
    }

    /// 렌더링 가능한 HTML로 변환합니다.
    pub fn to_html(&self) -> String {
        match self {
            ContentKind::Html(html) => html.clone(),
            ContentKind::PlainText(text) => plain_text_to_html(text),
        }
    }

    /// 단어 단위 diff에 넣을 텍스트.
    ///
    /// HTML은 태그를 걷어내고 블록 경계(`</p>`, `<br>` 등)를 줄바꿈으로 바꿉니다.
    /// diff 렌더러가 결과를 다시 이스케이프하므로 엔티티는 문자로 되돌려 둡니다.
    /// 평문은 그대로 빌려줍니다.
    pub fn to_diff_text(&self) -> Cow<'_, str> {
        match self {
            ContentKind::Html(html) => Cow::Owned(html_to_text(html)),
            ContentKind::PlainText(text) => Cow::Borrowed(text),
        }
    }
}

/// HTML → diff용 텍스트
fn html_to_text(html: &str) -> String {
    // 블록이 끝나는 곳은 줄바꿈, 나머지 태그는 제거
    let text = BLOCK_END.replace_all(html, "\n");
    let text = ANY_TAG.replace_all(&text, "");

    // &amp;는 마지막에 풀어야 "&amp;lt;"가 "<"로 두 번 풀리지 않습니다.
    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");

    let text = PARAGRAPH_BREAK.replace_all(&text, "\n\n");
    text.trim_matches('\n').to_string()
}

/// 평문 → HTML. 순서가 중요합니다 (굵게를 기울임보다 먼저 처리해야 `**`가 `*` 두 개로 읽히지 않음).
fn plain_text_to_html(text: &str) -> String {
    // 사용자 입력이 그대로 마크업이 되지 않도록 먼저 이스케이프합니다.
    let escaped = escape_html(&text.replace("\r\n", "\n"));

    let html = PARAGRAPH_BREAK.replace_all(&escaped, "</p><p>");
    let html = html.replace('\n', "<br>");
    let html = BOLD_STARS.replace_all(&html, "<strong>${1}</strong>");
    let html = BOLD_UNDERSCORES.replace_all(&html, "<strong>${1}</strong>");
    let html = ITALIC_STAR.replace_all(&html, "<em>${1}</em>");
    let html = ITALIC_UNDERSCORE.replace_all(&html, "<em>${1}</em>");
    let html = UNDERLINE.replace_all(&html, "<u>${1}</u>");

    format!("<p>{html}</p>")
}

/// HTML 특수문자 이스케이프. diff 렌더러도 같은 함수를 씁니다.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(raw: &str) -> String {
        ContentKind::detect(raw).to_html()
    }

    #[test]
    fn html_passes_through_unchanged() {
        assert_eq!(normalize("<p>Hello</p>"), "<p>Hello</p>");
        let div = "<DIV class=\"clause\">Section 1</DIV>";
        assert_eq!(normalize(div), div);
        assert_eq!(ContentKind::detect("<h2>Recitals</h2>").format(), ContentFormat::Html);
    }

    #[test]
    fn blank_lines_become_paragraphs() {
        assert_eq!(normalize("Hello\n\nWorld"), "<p>Hello</p><p>World</p>");
        assert_eq!(normalize("Hello\n\n\n\nWorld"), "<p>Hello</p><p>World</p>");
    }

    #[test]
    fn single_newlines_become_line_breaks() {
        assert_eq!(normalize("a\nb"), "<p>a<br>b</p>");
        assert_eq!(normalize("a\r\nb"), "<p>a<br>b</p>");
    }

    #[test]
    fn emphasis_markers_are_converted() {
        assert_eq!(
            normalize("**Buyer** and __Seller__"),
            "<p><strong>Buyer</strong> and <strong>Seller</strong></p>"
        );
        assert_eq!(
            normalize("*net* of _taxes_"),
            "<p><em>net</em> of <em>taxes</em></p>"
        );
        assert_eq!(normalize("~Closing~"), "<p><u>Closing</u></p>");
    }

    #[test]
    fn plain_text_is_escaped() {
        assert_eq!(
            normalize("price < cap & fees"),
            "<p>price &lt; cap &amp; fees</p>"
        );
        // <b>는 HTML 판별 대상이 아니므로 평문으로 취급되어 이스케이프됩니다.
        assert_eq!(ContentKind::detect("<b>x</b>").format(), ContentFormat::PlainText);
        assert_eq!(normalize("<b>x</b>"), "<p>&lt;b&gt;x&lt;/b&gt;</p>");
    }

    #[test]
    fn stored_format_is_not_resniffed() {
        let kind = ContentKind::from_stored(ContentFormat::PlainText, "<p>raw</p>".to_string());
        assert_eq!(kind.to_html(), "<p>&lt;p&gt;raw&lt;/p&gt;</p>");
    }

    #[test]
    fn html_diff_text_drops_tags() {
        let kind = ContentKind::detect("<h2>Price</h2><p>Price is <strong>10</strong></p><p>Fees &amp; costs</p>");
        assert_eq!(kind.to_diff_text(), "Price\nPrice is 10\nFees & costs");
    }

    #[test]
    fn plain_diff_text_is_borrowed() {
        let kind = ContentKind::detect("Price is 10");
        assert!(matches!(kind.to_diff_text(), Cow::Borrowed("Price is 10")));
        assert_eq!(kind.as_str(), "Price is 10");
    }
}
