use crate::application::ports::store::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlStateClass {
    /// Class 23: integrity constraint violation.
    Integrity,
    /// Class 22: data exception.
    Data,
    Other,
}

pub fn classify_sqlstate(code: &str) -> SqlStateClass {
    match code.get(..2) {
        Some("23") => SqlStateClass::Integrity,
        Some("22") => SqlStateClass::Data,
        _ => SqlStateClass::Other,
    }
}

pub fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    let classified = match &err {
        sqlx::Error::Database(db) => {
            let class = db
                .code()
                .map(|c| classify_sqlstate(&c))
                .unwrap_or(SqlStateClass::Other);
            match class {
                SqlStateClass::Integrity => Some(StoreError::Integrity(db.message().to_string())),
                SqlStateClass::Data => Some(StoreError::Data(db.message().to_string())),
                SqlStateClass::Other => None,
            }
        }
        _ => None,
    };
    classified.unwrap_or_else(|| StoreError::Backend(err.into()))
}
