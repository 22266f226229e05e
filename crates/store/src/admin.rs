use std::sync::RwLock;

use anyhow::{Result, bail};
use chrono::{NaiveDateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Role {
    pub name: String,
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamManager {
    pub name: String,
    pub group_name: String,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamLeader {
    pub name: String,
    pub group_name: String,
    pub tm_name: String,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

/// The fixed role/permission table. Roles are created from this set;
/// permissions are advisory metadata for the admin panel.
pub fn default_roles() -> Vec<Role> {
    let role = |name: &str, permissions: &[&str]| Role {
        name: name.to_string(),
        permissions: permissions.iter().map(|p| p.to_string()).collect(),
    };

    vec![
        role(
            "admin",
            &[
                "upload_agent_data",
                "update_team_data",
                "view_distribution",
                "manage_team_leaders",
                "manage_agents",
                "full_access",
            ],
        ),
        role("data_entry", &["upload_agent_data"]),
        role(
            "tm",
            &["view_distribution", "manage_team_leaders", "manage_agents"],
        ),
        role("tl", &["view_distribution"]),
    ]
}

/// Users, roles and the TM/TL hierarchy behind the admin panel.
pub struct AdminRegistry {
    users: RwLock<Vec<User>>,
    roles: Vec<Role>,
    team_managers: RwLock<Vec<TeamManager>>,
    team_leaders: RwLock<Vec<TeamLeader>>,
}

impl AdminRegistry {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(Vec::new()),
            roles: default_roles(),
            team_managers: RwLock::new(Vec::new()),
            team_leaders: RwLock::new(Vec::new()),
        }
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn users(&self) -> Vec<User> {
        self.users.read().unwrap().clone()
    }

    pub fn create_user(&self, username: &str, role_name: &str) -> Result<User> {
        let username = username.trim();
        if username.is_empty() {
            bail!("Username is required");
        }
        if !self
            .roles
            .iter()
            .any(|r| r.name.eq_ignore_ascii_case(role_name))
        {
            bail!("Unknown role: {}", role_name);
        }

        let mut users = self.users.write().unwrap();
        if users
            .iter()
            .any(|u| u.username.eq_ignore_ascii_case(username))
        {
            bail!("Username already exists: {}", username);
        }

        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            roles: vec![role_name.to_lowercase()],
        };
        users.push(user.clone());
        Ok(user)
    }

    /// Delete by id. A user cannot delete themselves.
    pub fn delete_user(&self, id: Uuid, acting_username: &str) -> Result<User> {
        let mut users = self.users.write().unwrap();
        let Some(position) = users.iter().position(|u| u.id == id) else {
            bail!("User not found");
        };
        if users[position]
            .username
            .eq_ignore_ascii_case(acting_username)
        {
            bail!("You cannot delete yourself");
        }
        Ok(users.remove(position))
    }

    pub fn team_managers(&self) -> Vec<TeamManager> {
        self.team_managers.read().unwrap().clone()
    }

    pub fn team_leaders(&self) -> Vec<TeamLeader> {
        self.team_leaders.read().unwrap().clone()
    }

    pub fn create_team_manager(&self, name: &str, group_name: &str) -> Result<TeamManager> {
        let name = name.trim();
        if name.is_empty() {
            bail!("Team manager name is required");
        }

        let mut managers = self.team_managers.write().unwrap();
        if managers.iter().any(|tm| tm.name.eq_ignore_ascii_case(name)) {
            bail!("Team manager already exists: {}", name);
        }

        let manager = TeamManager {
            name: name.to_string(),
            group_name: group_name.trim().to_string(),
            is_active: true,
            created_at: Utc::now().naive_utc(),
        };
        managers.push(manager.clone());
        Ok(manager)
    }

    /// TLs must hang off an existing TM.
    pub fn create_team_leader(&self, name: &str, tm_name: &str) -> Result<TeamLeader> {
        let name = name.trim();
        if name.is_empty() {
            bail!("Team leader name is required");
        }

        let managers = self.team_managers.read().unwrap();
        let Some(manager) = managers
            .iter()
            .find(|tm| tm.name.eq_ignore_ascii_case(tm_name))
        else {
            bail!("Unknown team manager: {}", tm_name);
        };

        let leader = TeamLeader {
            name: name.to_string(),
            group_name: manager.group_name.clone(),
            tm_name: manager.name.clone(),
            is_active: true,
            created_at: Utc::now().naive_utc(),
        };
        drop(managers);

        let mut leaders = self.team_leaders.write().unwrap();
        if leaders.iter().any(|tl| tl.name.eq_ignore_ascii_case(name)) {
            bail!("Team leader already exists: {}", name);
        }
        leaders.push(leader.clone());
        Ok(leader)
    }

    pub fn deactivate_team_manager(&self, name: &str) -> Result<()> {
        let mut managers = self.team_managers.write().unwrap();
        let Some(manager) = managers
            .iter_mut()
            .find(|tm| tm.name.eq_ignore_ascii_case(name))
        else {
            bail!("Unknown team manager: {}", name);
        };
        manager.is_active = false;
        Ok(())
    }
}

impl Default for AdminRegistry {
    fn default() -> Self {
        Self::new()
    }
}
