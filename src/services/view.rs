//! # 버전 비교 화면 (Comparison View)
//!
//! 세 개의 탭을 가진 비교 화면의 상태와 렌더링을 담당합니다.
//!
//! ```text
//! Changes ⇄ Original ⇄ New      (초기 상태: Changes)
//! ```
//!
//! 탭 전환은 어떤 탭의 내용을 보여줄지만 바꿉니다. Escape 키는 어느 탭에서든
//! 화면 전체를 닫는 [`ViewEvent::Close`]를 발생시킵니다.
//!
//! 각 탭의 내용은 렌더링할 때마다 다시 정규화하며 캐시하지 않습니다.

use super::normalize::{escape_html, ContentKind};
use crate::models::{AiSummary, ChangeType, DocumentVersionSummary, Significance};

/// 비교 화면의 탭
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ComparisonTab {
    #[default]
    Changes,
    Original,
    New,
}

impl ComparisonTab {
    /// 화면에 표시되는 순서
    pub const ALL: [ComparisonTab; 3] =
        [ComparisonTab::Changes, ComparisonTab::Original, ComparisonTab::New];

    /// URL 쿼리(`?tab=original`)에 쓰는 이름
    pub fn as_str(self) -> &'static str {
        match self {
            ComparisonTab::Changes => "changes",
            ComparisonTab::Original => "original",
            ComparisonTab::New => "new",
        }
    }

    /// `?tab=` 값을 해석합니다. 대소문자와 앞뒤 공백은 무시하고, 모르는 이름이면 None.
    pub fn parse(value: &str) -> Option<Self> {
        // .into_iter(): 배열을 값으로 순회 (ComparisonTab은 Copy)
        Self::ALL
            .into_iter()
            .find(|tab| tab.as_str().eq_ignore_ascii_case(value.trim()))
    }

    /// 탭에 표시할 이름
    fn label(self) -> &'static str {
        match self {
            ComparisonTab::Changes => "Changes",
            ComparisonTab::Original => "Original",
            ComparisonTab::New => "New",
        }
    }
}

/// 화면 밖으로 내보내는 이벤트. 닫기 외에는 없습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewEvent {
    Close,
}

/// 화면이 받는 키 입력 중 의미 있는 것들
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Other,
}

/// 비교 화면 입력. 내용이 없으면 해당 탭은 빈 화면입니다.
#[derive(Debug, Clone)]
pub struct ComparisonViewInput {
    pub original_version: DocumentVersionSummary,
    pub new_version: DocumentVersionSummary,
    pub diff_html: String,
    pub content_v1: Option<ContentKind>,
    pub content_v2: Option<ContentKind>,
    pub ai_summary: Option<AiSummary>,
}

/// 비교 화면 상태
///
/// 입력은 만들 때 한 번 받고 바뀌지 않습니다. 바뀌는 것은 현재 탭(`active`)뿐입니다.
#[derive(Debug, Clone)]
pub struct ComparisonView {
    input: ComparisonViewInput,
    /// 현재 선택된 탭 (초기값: Changes)
    active: ComparisonTab,
}

impl ComparisonView {
    /// 항상 Changes 탭에서 시작합니다.
    pub fn new(input: ComparisonViewInput) -> Self {
        Self { input, active: ComparisonTab::default() }
    }

    pub fn active_tab(&self) -> ComparisonTab {
        self.active
    }

    /// 탭 직접 선택 (탭 링크 클릭)
    pub fn select(&mut self, tab: ComparisonTab) {
        self.active = tab;
    }

    /// Changes → Original → New 방향. 마지막 탭에서는 그대로입니다.
    pub fn next(&mut self) {
        self.active = match self.active {
            ComparisonTab::Changes => ComparisonTab::Original,
            ComparisonTab::Original | ComparisonTab::New => ComparisonTab::New,
        };
    }

    /// New → Original → Changes 방향. 첫 탭에서는 그대로입니다.
    pub fn previous(&mut self) {
        self.active = match self.active {
            ComparisonTab::New => ComparisonTab::Original,
            ComparisonTab::Original | ComparisonTab::Changes => ComparisonTab::Changes,
        };
    }

    /// 키 입력 처리. Escape는 탭과 무관하게 화면 전체를 닫습니다.
    /// 탭 상태는 바꾸지 않으므로 `&self`로 충분합니다.
    pub fn handle_key(&self, key: Key) -> Option<ViewEvent> {
        match key {
            Key::Escape => Some(ViewEvent::Close),
            Key::Other => None,
        }
    }

    /// 현재 탭에 보여줄 HTML
    ///
    /// - Changes: diff HTML 그대로
    /// - Original / New: 저장된 형식에 맞춰 정규화한 내용
    pub fn active_content(&self) -> String {
        match self.active {
            ComparisonTab::Changes => self.input.diff_html.clone(),
            ComparisonTab::Original => pane_html(self.input.content_v1.as_ref()),
            ComparisonTab::New => pane_html(self.input.content_v2.as_ref()),
        }
    }

    /// 전체 화면을 HTML 문서로 렌더링합니다.
    ///
    /// `close_href`: 닫기 버튼과 Escape 키가 이동할 주소
    ///
    /// 구성 (위에서 아래로):
    /// 1. 헤더: 두 버전의 번호 · 파일명 · 업로더 · 업로드 시각, 닫기 버튼
    /// 2. 탭 목록: 각 탭은 `?v1=&v2=&tab=` 링크
    /// 3. 현재 탭의 내용
    /// 4. AI 변경 요약 (있을 때만)
    /// 5. Escape 키 처리 스크립트
    pub fn render_page(&self, close_href: &str) -> String {
        let original = &self.input.original_version;
        let updated = &self.input.new_version;
        // 속성 값으로 들어가므로 따옴표까지 이스케이프된 값을 씁니다.
        let close_href = escape_html(close_href);

        // 문서 전체를 하나의 String에 차례로 이어 붙입니다.
        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        html.push_str(&format!(
            "<title>Compare v{} and v{}</title>\n",
            original.version_number, updated.version_number
        ));
        html.push_str(
            "<style>ins.diff-added{background:#d4f8d4;text-decoration:none}\
             del.diff-removed{background:#f8d4d4}\
             .tab.active{font-weight:bold}</style>\n</head>\n<body>\n",
        );

        // ── 1. 헤더 ──
        html.push_str("<header class=\"comparison-header\">\n");
        html.push_str(&format!(
            "<div class=\"version original\">{}</div>\n",
            version_label(original)
        ));
        html.push_str(&format!("<div class=\"version new\">{}</div>\n", version_label(updated)));
        html.push_str(&format!("<a class=\"close\" href=\"{close_href}\">Close</a>\n"));
        html.push_str("</header>\n");

        // ── 2. 탭 목록 ──
        // 탭 전환은 같은 페이지를 다른 `tab` 값으로 다시 요청하는 링크입니다.
        html.push_str("<nav class=\"tabs\">\n");
        for tab in ComparisonTab::ALL {
            let class = if tab == self.active { "tab active" } else { "tab" };
            html.push_str(&format!(
                "<a class=\"{class}\" href=\"?v1={}&amp;v2={}&amp;tab={}\">{}</a>\n",
                original.version_number,
                updated.version_number,
                tab.as_str(),
                tab.label()
            ));
        }
        html.push_str("</nav>\n");

        // ── 3. 현재 탭 내용 ──
        // active_content()는 호출할 때마다 새로 정규화합니다 (캐시 없음).
        html.push_str(&format!(
            "<main class=\"pane {}\">{}</main>\n",
            self.active.as_str(),
            self.active_content()
        ));

        // ── 4. AI 변경 요약 ──
        if let Some(summary) = &self.input.ai_summary {
            render_summary(&mut html, summary);
        }

        // ── 5. Escape → 닫기 ──
        // 어느 탭에서든 같은 동작이므로 handle_key(Key::Escape)와 같은 의미입니다.
        html.push_str(&format!(
            "<script>document.addEventListener('keydown',function(e){{if(e.key==='Escape'){{window.location.href='{close_href}';}}}});</script>\n"
        ));
        html.push_str("</body>\n</html>\n");
        html
    }
}

/// 내용이 없으면(None) 빈 문자열
fn pane_html(content: Option<&ContentKind>) -> String {
    // .map(ContentKind::to_html): 메서드를 함수처럼 전달할 수 있습니다.
    content.map(ContentKind::to_html).unwrap_or_default()
}

/// "Version 2 · spa.txt · Dana · 2026-01-01T..." 형태의 헤더 문구
fn version_label(version: &DocumentVersionSummary) -> String {
    // 업로더가 없거나 삭제된 경우 "Unknown"
    let uploader = version.uploaded_by_name.as_deref().unwrap_or("Unknown");
    format!(
        "Version {} &middot; {} &middot; {} &middot; {}",
        version.version_number,
        escape_html(&version.file_name),
        escape_html(uploader),
        escape_html(&version.created_at)
    )
}

/// 에러 항목도 일반 변경 항목과 같은 목록에 표시합니다 (별도 배너 없음).
fn render_summary(html: &mut String, summary: &AiSummary) {
    html.push_str("<aside class=\"ai-summary\">\n<h2>Summary of Changes</h2>\n");
    html.push_str(&format!("<p>{}</p>\n", escape_html(&summary.summary)));

    // class에 종류와 중요도를 함께 넣어 CSS로 색을 구분합니다. 예: "change addition high"
    html.push_str("<ul class=\"significant-changes\">\n");
    for change in &summary.significant_changes {
        html.push_str(&format!(
            "<li class=\"change {} {}\"><strong>{}</strong>: {}</li>\n",
            change_type_class(change.change_type),
            significance_class(change.significance),
            escape_html(&change.section),
            escape_html(&change.description)
        ));
    }
    html.push_str("</ul>\n");

    if !summary.unchanged_sections.is_empty() {
        html.push_str("<h3>Unchanged Sections</h3>\n<ul class=\"unchanged-sections\">\n");
        for section in &summary.unchanged_sections {
            html.push_str(&format!("<li>{}</li>\n", escape_html(section)));
        }
        html.push_str("</ul>\n");
    }
    html.push_str("</aside>\n");
}

fn change_type_class(change_type: ChangeType) -> &'static str {
    match change_type {
        ChangeType::Addition => "addition",
        ChangeType::Removal => "removal",
        ChangeType::Modification => "modification",
        ChangeType::Error => "error",
    }
}

fn significance_class(significance: Significance) -> &'static str {
    match significance {
        Significance::High => "high",
        Significance::Medium => "medium",
        Significance::Low => "low",
    }
}
