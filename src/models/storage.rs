use serde::{Deserialize, Serialize};

use super::{trimmed, UserNo};
use crate::entity::{Entity, Messages, Named};

/// A tip storage (folder).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Storage {
    pub storage_no: i64,
    pub name: String,
}

/// Create payload. A `group_no` makes it a group storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageDraft {
    pub name: String,
    pub group_no: Option<i64>,
}

impl StorageDraft {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: trimmed(name.as_ref()),
            group_no: None,
        }
    }

    pub fn in_group(mut self, group_no: i64) -> Self {
        self.group_no = Some(group_no);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "op")]
pub enum StoragePatch {
    Rename { name: String },
}

impl Entity for Storage {
    type Id = i64;
    type Owner = UserNo;
    type Draft = StorageDraft;
    type Patch = StoragePatch;

    const KIND: &'static str = "storage";

    fn id(&self) -> &i64 {
        &self.storage_no
    }

    fn set_id(&mut self, id: i64) {
        self.storage_no = id;
    }

    fn from_draft(id: i64, draft: &StorageDraft) -> Self {
        Storage {
            storage_no: id,
            name: trimmed(&draft.name),
        }
    }

    fn apply(&mut self, patch: &StoragePatch) {
        match patch {
            StoragePatch::Rename { name } => self.name = name.clone(),
        }
    }

    fn validate_draft(draft: &StorageDraft) -> Result<(), String> {
        if draft.name.trim().is_empty() {
            return Err("보관함 이름이 비어 있습니다.".into());
        }
        Ok(())
    }

    fn messages() -> Messages {
        Messages {
            load: "내 보관함 목록을 불러오지 못했습니다.",
            add: "보관함 생성 실패",
            update: "이름 변경 실패",
            remove: "삭제 실패",
        }
    }
}

impl Named for Storage {
    fn rename_patch(name: String) -> StoragePatch {
        StoragePatch::Rename { name }
    }
}
