pub mod category;
pub mod dashboard;
pub mod fake_user;
pub mod settings;
pub mod user;

pub use category::{Category, NewCategory, NewCategoryForm};
pub use dashboard::{
    ActivityItem, CityEntry, DashboardStats, Growth, GrowthSign, LoginLabel, LoginSlice,
};
pub use fake_user::{CityGroup, FakeUser, FakeUserStatus, GenerateFakeUsers, StatusToggle};
pub use settings::{AdminSettings, Discounts, RevenueSplit, SettingsForm, SplitBar};
pub use user::{LoginGroup, User, UserSortColumn};
