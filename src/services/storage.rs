//! # 업로드 파일 저장 서비스
//!
//! 새 버전이 업로드되면 원본 내용을 업로드 디렉토리에도 파일로 남깁니다.
//! DB의 `file_content`가 기준 데이터이고, 디스크 파일은 다운로드/백업용 사본입니다.
//!
//! 이 모듈의 함수들:
//! - `upload_file_path()`: 문서 ID, 버전 번호, 파일명으로 저장 경로 생성
//! - `store_upload()`: 내용을 디스크에 저장

use crate::error::AppError;
// Path : PathBuf = &str : String
use std::path::{Path, PathBuf};
// 비동기 서버에서는 블로킹 std::fs 대신 tokio::fs를 사용합니다.
use tokio::fs;

/// 업로드 파일의 상대 경로를 생성합니다.
///
/// 파일명의 확장자는 유지하고, 나머지 부분은 slug로 바꿉니다.
///
/// # 예시
/// ```text
/// upload_file_path("0190…", 3, "Share Purchase Agreement.docx") → "0190…/v3-share-purchase-agreement.docx"
/// upload_file_path("0190…", 1, "메모") → "0190…/v1-메모"
/// ```
pub fn upload_file_path(document_id: &str, version_number: i64, file_name: &str) -> String {
    let path = Path::new(file_name);
    // .file_stem(): 확장자를 뺀 파일 이름, .extension(): 확장자
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);
    let mut slug = slug::slugify(stem);
    if slug.is_empty() {
        slug = "document".to_string();
    }

    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!(
            "{}/v{}-{}.{}",
            slug::slugify(document_id),
            version_number,
            slug,
            ext.to_ascii_lowercase()
        ),
        None => format!("{}/v{}-{}", slug::slugify(document_id), version_number, slug),
    }
}

/// 업로드 내용을 디스크에 저장하고 상대 경로를 반환합니다.
///
/// 부모 디렉토리가 없으면 자동으로 생성합니다.
pub async fn store_upload(
    uploads_path: &str,
    document_id: &str,
    version_number: i64,
    file_name: &str,
    content: &str,
) -> Result<String, AppError> {
    let relative = upload_file_path(document_id, version_number, file_name);
    let full_path = PathBuf::from(uploads_path).join(&relative);

    if let Some(parent) = full_path.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(&full_path, content).await?;

    tracing::debug!("Stored upload at {}", full_path.display());
    Ok(relative)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_extension_and_slugifies_stem() {
        assert_eq!(
            upload_file_path("doc-1", 3, "Share Purchase Agreement.DOCX"),
            "doc-1/v3-share-purchase-agreement.docx"
        );
        assert_eq!(upload_file_path("doc-1", 1, "notes"), "doc-1/v1-notes");
    }

    #[test]
    fn path_traversal_is_flattened() {
        let path = upload_file_path("../etc", 1, "../../passwd.txt");
        assert!(!path.contains(".."));
        assert!(path.ends_with(".txt"));
    }

    #[tokio::test]
    async fn writes_content_under_uploads_dir() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = dir.path().to_str().unwrap();

        let relative = store_upload(uploads, "doc-1", 2, "spa.txt", "Clause 1").await.unwrap();
        let written = tokio::fs::read_to_string(dir.path().join(&relative)).await.unwrap();
        assert_eq!(written, "Clause 1");
    }
}
