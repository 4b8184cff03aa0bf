//! Auth-context view: who the caller is, which clubs they can touch and
//! what they may do in each one.

use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use crate::upstream::dto::{ClubDto, MembershipDto, OrganizationDto, UserDto};

/// Permissions every authenticated caller holds regardless of club role.
const GLOBAL_PERMISSIONS: &[&str] = &["profile:read", "clubs:list"];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthContextView {
    pub user: UserView,
    pub organization: OrganizationView,
    pub clubs: Vec<ClubView>,
    pub permissions: PermissionsMap,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationView {
    pub id: Uuid,
    pub trade_name: String,
    pub business_name: String,
    pub subscription_plan: String,
    pub subscription_features: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubView {
    pub id: Uuid,
    pub name: String,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionsMap {
    pub global: Vec<String>,
    pub by_club: HashMap<Uuid, Vec<String>>,
}

/// Compose the aggregated auth context from the four upstream fetches.
///
/// Invariant: no club outside `organization.id` survives, whatever the
/// upstream returned. The club list is the tenant boundary the rest of
/// the frontend trusts.
pub fn build_auth_context(
    user: UserDto,
    organization: OrganizationDto,
    clubs: Vec<ClubDto>,
    memberships: Vec<MembershipDto>,
) -> AuthContextView {
    let roles: HashMap<Uuid, &str> =
        memberships.iter().map(|m| (m.club_id, m.role.as_str())).collect();

    let clubs: Vec<ClubView> = clubs
        .into_iter()
        .filter(|c| c.organization_id == organization.id && c.is_active)
        .map(|c| ClubView {
            role: roles.get(&c.id).map(|r| r.to_string()),
            id: c.id,
            name: c.name,
        })
        .collect();

    let mut by_club = HashMap::new();
    for membership in &memberships {
        // memberships can reference clubs of another organization if the
        // upstream is inconsistent; only clubs that survived the filter count
        if !clubs.iter().any(|c| c.id == membership.club_id) {
            continue;
        }
        by_club.insert(membership.club_id, club_permissions(membership));
    }

    AuthContextView {
        user: UserView {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
        },
        organization: OrganizationView {
            id: organization.id,
            trade_name: organization.trade_name,
            business_name: organization.business_name,
            subscription_plan: organization.subscription_plan,
            subscription_features: organization.subscription_features,
        },
        clubs,
        permissions: PermissionsMap {
            global: GLOBAL_PERMISSIONS.iter().map(|s| s.to_string()).collect(),
            by_club,
        },
    }
}

/// Role-derived permissions plus any explicit grants on the membership,
/// deduplicated and sorted for stable output.
fn club_permissions(membership: &MembershipDto) -> Vec<String> {
    let role_grants: &[&str] = match membership.role.as_str() {
        "owner" => &[
            "club:manage",
            "courts:manage",
            "reservations:manage",
            "finance:view",
            "analytics:view",
        ],
        "admin" => &["courts:manage", "reservations:manage", "finance:view", "analytics:view"],
        "staff" => &["reservations:manage", "analytics:view"],
        _ => &["reservations:view"],
    };

    let mut perms: Vec<String> = role_grants
        .iter()
        .map(|s| s.to_string())
        .chain(membership.permissions.iter().cloned())
        .collect();
    perms.sort();
    perms.dedup();
    perms
}
