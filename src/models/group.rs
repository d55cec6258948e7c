use serde::{Deserialize, Serialize};

use super::{trimmed, UserNo};
use crate::entity::{Entity, Messages, Named};

/// A sharing group the current user belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub group_no: i64,
    pub name: String,
    pub member_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDraft {
    pub name: String,
}

impl GroupDraft {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: trimmed(name.as_ref()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "op")]
pub enum GroupPatch {
    Rename { name: String },
}

impl Entity for Group {
    type Id = i64;
    type Owner = UserNo;
    type Draft = GroupDraft;
    type Patch = GroupPatch;

    const KIND: &'static str = "group";

    fn id(&self) -> &i64 {
        &self.group_no
    }

    fn set_id(&mut self, id: i64) {
        self.group_no = id;
    }

    /// New groups start without members; the server fills the count on the next load.
    fn from_draft(id: i64, draft: &GroupDraft) -> Self {
        Group {
            group_no: id,
            name: trimmed(&draft.name),
            member_count: 0,
        }
    }

    fn apply(&mut self, patch: &GroupPatch) {
        match patch {
            GroupPatch::Rename { name } => self.name = name.clone(),
        }
    }

    fn validate_draft(draft: &GroupDraft) -> Result<(), String> {
        if draft.name.trim().is_empty() {
            return Err("그룹 이름이 비어 있습니다.".into());
        }
        Ok(())
    }

    fn messages() -> Messages {
        Messages {
            load: "그룹 목록을 불러오지 못했습니다.",
            add: "그룹 생성 실패",
            update: "그룹명 변경 실패",
            remove: "그룹 나가기 실패",
        }
    }
}

impl Named for Group {
    fn rename_patch(name: String) -> GroupPatch {
        GroupPatch::Rename { name }
    }
}
