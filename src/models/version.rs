use serde::{Deserialize, Serialize};

/// 버전 내용의 형식. 업로드 시점에 한 번만 판별되어 DB에 함께 저장됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ContentFormat {
    Html,
    PlainText,
}

/// 문서의 불변 스냅샷. 새 편집은 항상 `version_number + 1`인 새 행을 만듭니다.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DocumentVersion {
    pub id: String,
    pub document_id: String,
    pub version_number: i64,
    pub file_name: String,
    pub file_content: String,
    pub content_format: ContentFormat,
    pub uploaded_by_id: Option<String>,
    /// users 테이블과 LEFT JOIN으로 해석한 업로더 이름
    pub uploaded_by_name: Option<String>,
    pub created_at: String,
}

/// 목록 조회용. 내용(file_content)은 크기가 클 수 있어 제외합니다.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DocumentVersionSummary {
    pub id: String,
    pub document_id: String,
    pub version_number: i64,
    pub file_name: String,
    pub content_format: ContentFormat,
    pub uploaded_by_id: Option<String>,
    pub uploaded_by_name: Option<String>,
    pub created_at: String,
}

impl From<&DocumentVersion> for DocumentVersionSummary {
    fn from(version: &DocumentVersion) -> Self {
        Self {
            id: version.id.clone(),
            document_id: version.document_id.clone(),
            version_number: version.version_number,
            file_name: version.file_name.clone(),
            content_format: version.content_format,
            uploaded_by_id: version.uploaded_by_id.clone(),
            uploaded_by_name: version.uploaded_by_name.clone(),
            created_at: version.created_at.clone(),
        }
    }
}

/// 새 버전 업로드 요청. 바이너리 형식(docx, pdf)의 텍스트 추출은 클라이언트 쪽에서 끝난 상태입니다.
#[derive(Debug, Deserialize)]
pub struct CreateVersionRequest {
    pub file_name: String,
    pub file_content: String,
    pub uploaded_by_id: Option<String>,
}
