//! Wire decode - normalizes response bodies into canonical entities.
//!
//! The backend and the mock server disagree on field names (`id` vs
//! `groupNo`, `isFollow` vs `isFollowing`). Each entity declares an untagged
//! `Raw` shape that accepts every known variant; the conversion into the
//! entity happens here so the store only ever sees one shape.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::GatewayError;
use crate::models::{FollowTarget, Group, Storage, UserNo};

/// Entities that can be decoded from a response body.
pub trait FromWire: Sized {
    type Raw: DeserializeOwned + Into<Self>;
}

/// Decode a JSON array of entities in any accepted shape.
pub fn decode_list<T: FromWire>(body: &[u8]) -> Result<Vec<T>, GatewayError> {
    let raw: Vec<T::Raw> = serde_json::from_slice(body)?;
    Ok(raw.into_iter().map(Into::into).collect())
}

/// Decode a single entity in any accepted shape.
pub fn decode_one<T: FromWire>(body: &[u8]) -> Result<T, GatewayError> {
    let raw: T::Raw = serde_json::from_slice(body)?;
    Ok(raw.into())
}

#[derive(Deserialize)]
struct Created {
    #[serde(alias = "storageNo", alias = "groupNo", alias = "userNo")]
    id: i64,
}

/// Extract the new id from a create response (`{id}`, `{storageNo}`, `{groupNo}`).
pub fn decode_created(body: &[u8]) -> Result<i64, GatewayError> {
    let created: Created = serde_json::from_slice(body)?;
    Ok(created.id)
}

#[derive(Deserialize, Default)]
struct ApiErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Classify a non-2xx response. `message` wins over `error`; blank values are dropped.
pub fn error_from_response(status: u16, body: &[u8]) -> GatewayError {
    let parsed: ApiErrorBody = serde_json::from_slice(body).unwrap_or_default();
    let message = parsed
        .message
        .filter(|m| !m.trim().is_empty())
        .or(parsed.error.filter(|m| !m.trim().is_empty()));
    GatewayError::Status { status, message }
}

/// Both servers already agree on `{storageNo, name}`; extra fields such as
/// `userNo` are ignored.
impl FromWire for Storage {
    type Raw = Storage;
}

#[derive(Deserialize)]
#[serde(untagged)]
pub enum RawGroup {
    #[serde(rename_all = "camelCase")]
    Canonical {
        group_no: i64,
        name: String,
        #[serde(default)]
        member_count: u32,
    },
    #[serde(rename_all = "camelCase")]
    Backend {
        id: i64,
        name: String,
        #[serde(default)]
        member_count: u32,
    },
}

impl From<RawGroup> for Group {
    fn from(raw: RawGroup) -> Self {
        match raw {
            RawGroup::Canonical {
                group_no,
                name,
                member_count,
            } => Group {
                group_no,
                name,
                member_count,
            },
            RawGroup::Backend {
                id,
                name,
                member_count,
            } => Group {
                group_no: id,
                name,
                member_count,
            },
        }
    }
}

impl FromWire for Group {
    type Raw = RawGroup;
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFollow {
    user_no: UserNo,
    nickname: String,
    #[serde(default)]
    profile_image_url: Option<String>,
    #[serde(default)]
    login_id: Option<String>,
    #[serde(alias = "isFollow", default)]
    is_following: bool,
}

impl From<RawFollow> for FollowTarget {
    fn from(raw: RawFollow) -> Self {
        FollowTarget {
            user_no: raw.user_no,
            nickname: raw.nickname,
            profile_image_url: raw.profile_image_url.unwrap_or_default(),
            login_id: raw.login_id.unwrap_or_default(),
            is_following: raw.is_following,
        }
    }
}

impl FromWire for FollowTarget {
    type Raw = RawFollow;
}
