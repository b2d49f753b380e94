//! 정렬 순서 설정 저장소.
//!
//! 동기화 엔진은 정렬 순서를 바꿀 때마다 즉시(동기적으로) 저장합니다.
//! 저장소 오류는 치명적이지 않으며, 엔진은 `ORIGINAL`로 대체합니다.

use serde_json::{Map, Value};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use twstock_core::{PreferencesConfig, SortOrder, TwStockError, TwStockResult};

/// 정렬 순서 저장소.
pub trait PreferenceStore: Send + Sync {
    /// 저장된 정렬 순서를 읽습니다. 저장된 값이 없으면 `Ok(None)`.
    fn load_sort_order(&self) -> TwStockResult<Option<SortOrder>>;

    /// 정렬 순서를 저장합니다.
    fn save_sort_order(&self, order: SortOrder) -> TwStockResult<()>;
}

/// JSON 파일 기반 설정 저장소.
///
/// 파일은 문자열 키/값 객체이며, 정렬 순서 외의 키는 그대로 보존합니다.
/// 쓰기는 임시 파일에 기록한 뒤 rename 하므로 중간에 끊겨도 파일이 깨지지 않습니다.
#[derive(Debug)]
pub struct FilePreferenceStore {
    path: PathBuf,
    key: String,
}

impl FilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }

    /// 애플리케이션 설정의 `[preferences]` 섹션으로 생성합니다.
    pub fn from_config(config: &PreferencesConfig) -> Self {
        Self::new(config.path.clone(), config.sort_order_key.clone())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> TwStockResult<Map<String, Value>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => {
                return Err(TwStockError::Persistence(format!(
                    "설정 파일 읽기 실패 ({}): {}",
                    self.path.display(),
                    e
                )))
            }
        };

        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(TwStockError::Persistence(format!(
                "설정 파일 형식 오류 ({}): 객체가 아닙니다",
                self.path.display()
            ))),
            Err(e) => Err(TwStockError::Persistence(format!(
                "설정 파일 파싱 실패 ({}): {}",
                self.path.display(),
                e
            ))),
        }
    }

    fn write_map(&self, map: &Map<String, Value>) -> TwStockResult<()> {
        let persistence = |e: std::io::Error| {
            TwStockError::Persistence(format!(
                "설정 파일 쓰기 실패 ({}): {}",
                self.path.display(),
                e
            ))
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(persistence)?;
        }

        let body = serde_json::to_vec_pretty(map)
            .map_err(|e| TwStockError::Persistence(e.to_string()))?;

        let tmp_path = self.path.with_extension("tmp");
        {
            let mut file = fs::File::create(&tmp_path).map_err(persistence)?;
            file.write_all(&body).map_err(persistence)?;
            file.sync_all().map_err(persistence)?;
        }
        fs::rename(&tmp_path, &self.path).map_err(persistence)
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn load_sort_order(&self) -> TwStockResult<Option<SortOrder>> {
        let map = self.read_map()?;
        match map.get(&self.key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(raw)) => raw.parse().map(Some).map_err(|e: String| {
                TwStockError::Persistence(format!("저장된 정렬 순서 해석 실패: {}", e))
            }),
            Some(other) => Err(TwStockError::Persistence(format!(
                "저장된 정렬 순서 형식 오류: {}",
                other
            ))),
        }
    }

    fn save_sort_order(&self, order: SortOrder) -> TwStockResult<()> {
        // 읽을 수 없는 파일은 덮어쓰지 않음 (다른 키 보존)
        let mut map = self.read_map()?;
        map.insert(self.key.clone(), Value::String(order.as_str().to_string()));
        self.write_map(&map)?;

        tracing::debug!(path = %self.path.display(), sort_order = %order, "정렬 순서 저장");
        Ok(())
    }
}

/// 메모리 기반 설정 저장소.
///
/// 테스트와 일회성 실행용입니다. `failing()`으로 만들면 모든 호출이 실패합니다.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    value: RwLock<Option<SortOrder>>,
    fail: bool,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 값이 저장된 상태로 생성합니다.
    pub fn with_sort_order(order: SortOrder) -> Self {
        Self {
            value: RwLock::new(Some(order)),
            fail: false,
        }
    }

    /// 항상 실패하는 저장소를 생성합니다.
    pub fn failing() -> Self {
        Self {
            value: RwLock::new(None),
            fail: true,
        }
    }

    /// 현재 저장된 값 (테스트 검증용).
    pub fn stored(&self) -> Option<SortOrder> {
        self.value.read().ok().and_then(|v| *v)
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load_sort_order(&self) -> TwStockResult<Option<SortOrder>> {
        if self.fail {
            return Err(TwStockError::Persistence("저장소를 사용할 수 없습니다".to_string()));
        }
        self.value
            .read()
            .map(|v| *v)
            .map_err(|e| TwStockError::Persistence(e.to_string()))
    }

    fn save_sort_order(&self, order: SortOrder) -> TwStockResult<()> {
        if self.fail {
            return Err(TwStockError::Persistence("저장소를 사용할 수 없습니다".to_string()));
        }
        let mut guard = self
            .value
            .write()
            .map_err(|e| TwStockError::Persistence(e.to_string()))?;
        *guard = Some(order);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryPreferenceStore::new();
        assert_eq!(store.load_sort_order().unwrap(), None);

        store.save_sort_order(SortOrder::Descending).unwrap();
        assert_eq!(store.load_sort_order().unwrap(), Some(SortOrder::Descending));
        assert_eq!(store.stored(), Some(SortOrder::Descending));
    }

    #[test]
    fn test_memory_store_failing() {
        let store = MemoryPreferenceStore::failing();
        assert!(matches!(
            store.load_sort_order(),
            Err(TwStockError::Persistence(_))
        ));
        assert!(store.save_sort_order(SortOrder::Ascending).is_err());
    }

    #[test]
    fn test_file_store_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilePreferenceStore::new(dir.path().join("prefs.json"), "sort_order");
        assert_eq!(store.load_sort_order().unwrap(), None);
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prefs.json");

        FilePreferenceStore::new(&path, "sort_order")
            .save_sort_order(SortOrder::Ascending)
            .unwrap();

        let reopened = FilePreferenceStore::new(&path, "sort_order");
        assert_eq!(reopened.load_sort_order().unwrap(), Some(SortOrder::Ascending));

        let raw: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["sort_order"], "ASC");
    }

    #[test]
    fn test_file_store_preserves_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, r#"{"theme":"dark","sort_order":"DESC"}"#).unwrap();

        let store = FilePreferenceStore::new(&path, "sort_order");
        assert_eq!(store.load_sort_order().unwrap(), Some(SortOrder::Descending));

        store.save_sort_order(SortOrder::Original).unwrap();
        let raw: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["theme"], "dark");
        assert_eq!(raw["sort_order"], "ORIGINAL");
    }

    #[test]
    fn test_file_store_unknown_value_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, r#"{"sort_order":"SIDEWAYS"}"#).unwrap();

        let store = FilePreferenceStore::new(&path, "sort_order");
        assert!(matches!(
            store.load_sort_order(),
            Err(TwStockError::Persistence(_))
        ));
    }

    #[test]
    fn test_file_store_corrupt_file_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        let corrupt = r#"{"theme":"dark","#;
        fs::write(&path, corrupt).unwrap();

        let store = FilePreferenceStore::new(&path, "sort_order");
        assert!(matches!(
            store.save_sort_order(SortOrder::Ascending),
            Err(TwStockError::Persistence(_))
        ));
        assert_eq!(fs::read_to_string(&path).unwrap(), corrupt);
        assert!(!path.with_extension("tmp").exists());
    }
}
