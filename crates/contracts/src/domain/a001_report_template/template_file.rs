use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Тип файла шаблона
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateFileKind {
    Word,
    Spreadsheet,
    Slideshow,
}

impl TemplateFileKind {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "docx" => Some(TemplateFileKind::Word),
            "xlsx" => Some(TemplateFileKind::Spreadsheet),
            "pptx" => Some(TemplateFileKind::Slideshow),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            TemplateFileKind::Word => "docx",
            TemplateFileKind::Spreadsheet => "xlsx",
            TemplateFileKind::Slideshow => "pptx",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateFileError {
    #[error("Unsupported file type: {0}. Please use .docx, .xlsx, or .pptx files")]
    UnsupportedFileType(String),

    #[error("File name is empty")]
    EmptyName,
}

/// Ссылка на загруженный файл шаблона
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateFile {
    /// Имя файла без каталогов, например "Quarterly.docx"
    pub name: String,
    pub kind: TemplateFileKind,
}

impl TemplateFile {
    /// Определить тип по расширению имени файла
    pub fn from_filename(filename: &str) -> Result<Self, TemplateFileError> {
        let name = filename
            .rsplit(|c: char| c == '/' || c == '\\')
            .next()
            .unwrap_or(filename)
            .trim();
        if name.is_empty() {
            return Err(TemplateFileError::EmptyName);
        }

        let kind = name
            .rsplit_once('.')
            .and_then(|(_, ext)| TemplateFileKind::from_extension(ext))
            .ok_or_else(|| TemplateFileError::UnsupportedFileType(name.to_string()))?;

        let file = Self {
            name: name.to_string(),
            kind,
        };
        if file.base_name().trim().is_empty() {
            return Err(TemplateFileError::EmptyName);
        }
        Ok(file)
    }

    /// Имя файла без расширения
    pub fn base_name(&self) -> &str {
        match self.name.rsplit_once('.') {
            Some((stem, _)) => stem,
            None => &self.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted_extensions() {
        let f = TemplateFile::from_filename("Quarterly.docx").unwrap();
        assert_eq!(f.kind, TemplateFileKind::Word);
        assert_eq!(f.base_name(), "Quarterly");

        let f = TemplateFile::from_filename("Budget.XLSX").unwrap();
        assert_eq!(f.kind, TemplateFileKind::Spreadsheet);

        let f = TemplateFile::from_filename("deck.v2.pptx").unwrap();
        assert_eq!(f.kind, TemplateFileKind::Slideshow);
        assert_eq!(f.base_name(), "deck.v2");
    }

    #[test]
    fn test_directories_are_stripped() {
        let f = TemplateFile::from_filename("C:\\Users\\me\\XYZ template.docx").unwrap();
        assert_eq!(f.name, "XYZ template.docx");
        let f = TemplateFile::from_filename("/tmp/uploads/list.xlsx").unwrap();
        assert_eq!(f.name, "list.xlsx");
    }

    #[test]
    fn test_rejected_files() {
        assert_eq!(
            TemplateFile::from_filename("notes.pdf").unwrap_err(),
            TemplateFileError::UnsupportedFileType("notes.pdf".to_string())
        );
        assert!(matches!(
            TemplateFile::from_filename("docx"),
            Err(TemplateFileError::UnsupportedFileType(_))
        ));
        assert_eq!(
            TemplateFile::from_filename("   ").unwrap_err(),
            TemplateFileError::EmptyName
        );
        assert_eq!(
            TemplateFile::from_filename(".docx").unwrap_err(),
            TemplateFileError::EmptyName
        );
    }
}
