use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, KeySyncError>;

#[derive(Debug, Error)]
pub enum KeySyncError {
    #[error("Пустой ключ")]
    EmptyKey,

    #[error("Неверный формат ключа")]
    InvalidKeyFormat,

    #[error("Тип ключа '{declared}' не совпадает с содержимым ('{embedded}')")]
    KeyTypeMismatch { declared: String, embedded: String },

    #[error("Допускается только одна строка с одним ключом")]
    MultipleLines,

    #[error("Публичный ключ уже существует")]
    KeyAlreadyExists,

    #[error("Ключ с именем '{name}' уже есть у пользователя {owner}")]
    KeyNameTaken { owner: i64, name: String },

    #[error("Минимально допустимый размер публичного ключа {algorithm}: {minimum} бит")]
    KeyTooWeak { algorithm: String, minimum: u32 },

    #[error("Нераспознанный тип публичного ключа: {0}")]
    UnrecognizedKeyType(String),

    #[error("ssh-keygen -l -f: {0}")]
    OracleFailed(String),

    #[error("ssh-keygen вернул недостаточно данных для оценки ключа: {0}")]
    OracleOutput(String),

    #[error("ssh-keygen не ответил за {0:?}")]
    OracleTimeout(Duration),

    #[error("Не удалось проверить публичный ключ")]
    UnableToVerify,

    #[error("Не удалось определить размер ключа")]
    KeySizeUnknown,

    #[error("Публичный ключ {0} не существует")]
    KeyNotFound(i64),

    #[error("Поле '{0}' нельзя изменить")]
    ImmutableField(&'static str),

    #[error("Неверная конфигурация: {0}")]
    InvalidConfig(String),

    #[error("Запись authorized_keys не удалась ({write}), откат реестра тоже не удался ({rollback}); требуется rebuild")]
    Inconsistent {
        write: Box<KeySyncError>,
        rollback: Box<KeySyncError>,
    },

    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ошибка JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl KeySyncError {
    /// Errors the submitting user can fix themselves (bad key, duplicate,
    /// weak key, unknown id). Everything else is an operational failure.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyKey
                | Self::InvalidKeyFormat
                | Self::KeyTypeMismatch { .. }
                | Self::MultipleLines
                | Self::KeyAlreadyExists
                | Self::KeyNameTaken { .. }
                | Self::KeyTooWeak { .. }
                | Self::UnrecognizedKeyType(_)
                | Self::KeyNotFound(_)
                | Self::ImmutableField(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_user_errors_are_classified() {
        assert!(KeySyncError::EmptyKey.is_user_error());
        assert!(KeySyncError::KeyAlreadyExists.is_user_error());
        assert!(KeySyncError::KeyTooWeak {
            algorithm: "(RSA)".into(),
            minimum: 2048
        }
        .is_user_error());
        assert!(KeySyncError::KeyNotFound(7).is_user_error());
    }

    #[test]
    fn test_operational_errors_are_classified() {
        let io_err = KeySyncError::Io(io::Error::new(io::ErrorKind::Other, "disk full"));
        assert!(!io_err.is_user_error());
        assert!(!KeySyncError::OracleFailed("boom".into()).is_user_error());
        assert!(!KeySyncError::OracleTimeout(Duration::from_secs(1)).is_user_error());
    }

    #[test]
    fn test_inconsistent_reports_both_errors() {
        let err = KeySyncError::Inconsistent {
            write: Box::new(KeySyncError::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "write denied",
            ))),
            rollback: Box::new(KeySyncError::KeyNotFound(3)),
        };
        let display = err.to_string();
        assert!(display.contains("write denied"));
        assert!(display.contains('3'));
    }
}
