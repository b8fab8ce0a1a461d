use serde::{de::DeserializeOwned, Serialize};
use std::hash::Hash;

/// Типизированный идентификатор агрегата; в БД хранится строкой
pub trait AggregateId:
    Clone + Copy + PartialEq + Eq + Hash + Serialize + DeserializeOwned + std::fmt::Debug
{
    fn as_string(&self) -> String;

    /// Разбор строкового ID из пути запроса или колонки БД
    fn from_string(s: &str) -> Result<Self, String>;
}
