use serde::{Deserialize, Serialize};

use super::UserNo;
use crate::entity::{Entity, Messages};

/// A user shown in a follower/following list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowTarget {
    pub user_no: UserNo,
    pub nickname: String,
    #[serde(default)]
    pub profile_image_url: String,
    #[serde(default)]
    pub login_id: String,
    pub is_following: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "op")]
pub enum FollowPatch {
    SetFollowing { following: bool },
}

impl Entity for FollowTarget {
    type Id = UserNo;
    type Owner = UserNo;
    type Draft = FollowTarget;
    type Patch = FollowPatch;

    const KIND: &'static str = "follow";

    fn id(&self) -> &UserNo {
        &self.user_no
    }

    fn set_id(&mut self, id: UserNo) {
        self.user_no = id;
    }

    fn from_draft(id: UserNo, draft: &FollowTarget) -> Self {
        FollowTarget {
            user_no: id,
            ..draft.clone()
        }
    }

    fn apply(&mut self, patch: &FollowPatch) {
        match patch {
            FollowPatch::SetFollowing { following } => self.is_following = *following,
        }
    }

    fn messages() -> Messages {
        Messages {
            load: "팔로우 목록을 불러오지 못했습니다.",
            add: "팔로우 처리 실패",
            update: "팔로우 처리 실패",
            remove: "팔로우 처리 실패",
        }
    }
}
