pub use super::college::Entity as College;
pub use super::org_member::Entity as OrgMember;
pub use super::organization::Entity as Organization;
pub use super::program::Entity as Program;
pub use super::student::Entity as Student;
