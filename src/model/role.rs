use strum_macros::Display;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Admin = 1,
    Hr = 2,
    Employee = 3,
    /// Service accounts such as the HR sync scheduler.
    System = 4,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::Hr),
            3 => Some(Role::Employee),
            4 => Some(Role::System),
            _ => None,
        }
    }

    pub fn can_read_reports(&self) -> bool {
        matches!(self, Role::Admin | Role::Hr)
    }

    pub fn can_refresh_dashboard(&self) -> bool {
        matches!(self, Role::Admin | Role::System)
    }
}
