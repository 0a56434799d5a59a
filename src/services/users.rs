//! User management service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use chrono::{Datelike, Months, NaiveDate, Utc, Weekday};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        user::{CreateUser, NewUser, UserFilter, UserQuery},
        User, UserSummary,
    },
    pagination::{PagedResponse, Paginator, SortSpec},
    repository::Repository,
};

const MINIMUM_AGE_YEARS: u32 = 18;

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    paginator: Paginator,
}

impl UsersService {
    pub fn new(repository: Repository, paginator: Paginator) -> Self {
        Self {
            repository,
            paginator,
        }
    }

    /// Create a staff member or admin with a generated username and password
    pub async fn create(&self, request: CreateUser) -> AppResult<User> {
        request.validate()?;
        let (Some(date_of_birth), Some(joined_date), Some(location)) =
            (request.date_of_birth, request.joined_date, request.location)
        else {
            return Err(AppError::BadRequest("Missing required user fields.".to_string()));
        };

        let violations = date_rule_violations(date_of_birth, joined_date, Utc::now().date_naive());
        if !violations.is_empty() {
            return Err(AppError::Validation(violations));
        }

        let first_name = normalize_name(&request.first_name);
        let last_name = normalize_name(&request.last_name);

        let base = base_username(&first_name, &last_name);
        let taken = self.repository.users.usernames_starting_with(&base).await?;
        let username = next_available_username(&base, &taken);

        let password_hash = self.hash_password(&default_password(&username, date_of_birth))?;

        let user = NewUser {
            id: Uuid::new_v4(),
            username,
            first_name,
            last_name,
            date_of_birth,
            joined_date,
            gender: request.gender.unwrap_or_default(),
            role: request.role.unwrap_or_default(),
            location,
            password_hash,
            created_by: request.created_by.map(|id| id.to_string()),
        };

        let created = self.repository.users.create(&user).await?;
        tracing::info!(
            "User {} created with staff code {}",
            created.username,
            created.staff_code
        );
        Ok(created)
    }

    /// Hash a password using Argon2
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<User> {
        self.repository
            .users
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found.".to_string()))
    }

    /// Search users of one location
    pub async fn list(&self, query: UserQuery, route: &str) -> AppResult<PagedResponse<UserSummary>> {
        let filter = UserFilter {
            location: query.location,
            search: query.search,
            role: query.role,
        };
        let sort = SortSpec::new(query.order_by, query.is_descending);
        let page = self.paginator.filter(query.page_index, query.page_size);

        let (rows, total) = self.repository.users.filter(&filter, &sort, &page).await?;
        Ok(self.paginator.page(rows, &page, total, route))
    }

    /// Disable a user who holds no active assignment
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let user = self.get_by_id(id).await?;

        let active = self.repository.assignments.count_active_for_user(id).await?;
        if active > 0 {
            tracing::warn!("User {} still holds {} assignments", user.username, active);
            return Err(AppError::BusinessRule(
                "There are valid assignments belonging to this user. Please close all assignments before disabling user."
                    .to_string(),
            ));
        }

        if !self.repository.users.soft_delete(id).await? {
            return Err(AppError::NotFound("User not found.".to_string()));
        }

        tracing::info!("User {} disabled", user.username);
        Ok(())
    }
}

/// Collapse inner whitespace runs and trim
fn normalize_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lower-cased first name without spaces, then the initial of each last-name word.
/// "Binh", "Nguyen Van" gives "binhnv".
pub fn base_username(first_name: &str, last_name: &str) -> String {
    let mut username: String = first_name
        .split_whitespace()
        .collect::<String>()
        .to_lowercase();

    username.extend(
        last_name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .flat_map(char::to_lowercase),
    );
    username
}

/// `base` when free, otherwise `base` followed by the smallest free suffix from 1
pub fn next_available_username(base: &str, taken: &[String]) -> String {
    if !taken.iter().any(|name| name == base) {
        return base.to_string();
    }

    let suffixes: std::collections::HashSet<u32> = taken
        .iter()
        .filter_map(|name| name.strip_prefix(base))
        .filter(|suffix| !suffix.starts_with('0'))
        .filter_map(|suffix| suffix.parse().ok())
        .collect();

    let suffix = (1..)
        .find(|n| !suffixes.contains(n))
        .unwrap_or(u32::MAX);
    format!("{}{}", base, suffix)
}

/// `{username}@{ddMMyyyy}` from the date of birth
pub fn default_password(username: &str, date_of_birth: NaiveDate) -> String {
    format!("{}@{}", username, date_of_birth.format("%d%m%Y"))
}

/// Rules that span several fields or depend on today's date
pub fn date_rule_violations(
    date_of_birth: NaiveDate,
    joined_date: NaiveDate,
    today: NaiveDate,
) -> Vec<String> {
    let mut violations = Vec::new();

    let adult_on = date_of_birth.checked_add_months(Months::new(MINIMUM_AGE_YEARS * 12));
    if adult_on.map_or(true, |adult_on| adult_on > today) {
        violations.push("User is under 18. Please select a different date.".to_string());
    }

    if joined_date < date_of_birth {
        violations.push(
            "Joined date is not later than Date of Birth. Please select a different date."
                .to_string(),
        );
    }

    if matches!(joined_date.weekday(), Weekday::Sat | Weekday::Sun) {
        violations.push(
            "Joined date is Saturday or Sunday. Please select a different date.".to_string(),
        );
    }

    if joined_date > today {
        violations.push("Joined date cannot be in the future.".to_string());
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{Location, Role},
        services::testing::{self, date, Mocks},
    };
    use argon2::{PasswordHash, PasswordVerifier};

    fn service(mocks: Mocks) -> UsersService {
        UsersService::new(mocks.into_repository(), Paginator::default())
    }

    #[test]
    fn username_from_names() {
        assert_eq!(base_username("Binh", "Nguyen Van"), "binhnv");
        assert_eq!(base_username("Thanh Anh", "Tran"), "thanhanht");
    }

    #[test]
    fn username_suffix_fills_gaps() {
        let taken = |names: &[&str]| names.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        assert_eq!(next_available_username("binhnv", &taken(&[])), "binhnv");
        assert_eq!(next_available_username("binhnv", &taken(&["binhnv1"])), "binhnv");
        assert_eq!(next_available_username("binhnv", &taken(&["binhnv"])), "binhnv1");
        assert_eq!(
            next_available_username("binhnv", &taken(&["binhnv", "binhnv1", "binhnv3"])),
            "binhnv2"
        );
        // Longer names sharing the prefix do not count as suffixes
        assert_eq!(
            next_available_username("binhnv", &taken(&["binhnv", "binhnvt", "binhnv01"])),
            "binhnv1"
        );
    }

    #[test]
    fn password_uses_birth_date() {
        assert_eq!(default_password("binhnv", date(1993, 1, 20)), "binhnv@20011993");
    }

    #[test]
    fn date_rules() {
        let today = date(2024, 6, 14); // Friday

        assert!(date_rule_violations(date(1990, 1, 1), date(2024, 6, 10), today).is_empty());
        // Exactly 18 today is old enough
        assert!(date_rule_violations(date(2006, 6, 14), date(2024, 6, 14), today).is_empty());

        let under_age = date_rule_violations(date(2006, 6, 15), date(2024, 6, 14), today);
        assert_eq!(under_age, vec!["User is under 18. Please select a different date."]);

        let weekend = date_rule_violations(date(1990, 1, 1), date(2024, 6, 8), today);
        assert_eq!(weekend.len(), 1);
        assert!(weekend[0].contains("Saturday or Sunday"));

        let future = date_rule_violations(date(1990, 1, 1), date(2024, 6, 17), today);
        assert_eq!(future, vec!["Joined date cannot be in the future."]);

        let before_birth = date_rule_violations(date(1990, 1, 10), date(1990, 1, 9), today);
        assert!(before_birth
            .iter()
            .any(|m| m.starts_with("Joined date is not later than Date of Birth")));
    }

    #[tokio::test]
    async fn create_picks_free_username_and_hashes_default_password() {
        let mut mocks = Mocks::default();
        mocks
            .users
            .expect_usernames_starting_with()
            .withf(|prefix| prefix == "binhnv")
            .returning(|_| Ok(vec!["binhnv".to_string(), "binhnv1".to_string()]));
        mocks
            .users
            .expect_create()
            .withf(|user| {
                user.username == "binhnv2"
                    && user.last_name == "Nguyen Van"
                    && user.role == Role::Staff
                    && PasswordHash::new(&user.password_hash)
                        .map(|hash| {
                            Argon2::default()
                                .verify_password(b"binhnv2@15011990", &hash)
                                .is_ok()
                        })
                        .unwrap_or(false)
            })
            .times(1)
            .returning(|user| {
                let mut created = testing::user(user.id, user.joined_date);
                created.username = user.username.clone();
                Ok(created)
            });

        let request = CreateUser {
            first_name: "Binh".to_string(),
            last_name: " Nguyen   Van ".to_string(),
            date_of_birth: Some(date(1990, 1, 15)),
            joined_date: Some(date(2020, 1, 6)),
            gender: None,
            role: None,
            location: Some(Location::HaNoi),
            created_by: None,
        };

        let created = service(mocks).create(request).await.expect("user created");
        assert_eq!(created.username, "binhnv2");
    }

    #[tokio::test]
    async fn create_reports_date_rules_as_validation() {
        let request = CreateUser {
            first_name: "Binh".to_string(),
            last_name: "Nguyen".to_string(),
            date_of_birth: Some(date(1990, 1, 15)),
            joined_date: Some(date(2020, 1, 4)), // Saturday
            gender: None,
            role: None,
            location: Some(Location::HaNoi),
            created_by: None,
        };

        let err = service(Mocks::default()).create(request).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(messages) if messages.len() == 1));
    }

    #[tokio::test]
    async fn user_with_assignments_cannot_be_deleted() {
        let mut mocks = Mocks::default();
        mocks
            .users
            .expect_get_by_id()
            .returning(|id| Ok(Some(testing::user(id, date(2020, 1, 6)))));
        mocks
            .assignments
            .expect_count_active_for_user()
            .returning(|_| Ok(2));

        let err = service(mocks).delete(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::BusinessRule(_)));
    }

    #[tokio::test]
    async fn idle_user_is_soft_deleted() {
        let id = Uuid::new_v4();
        let mut mocks = Mocks::default();
        mocks
            .users
            .expect_get_by_id()
            .returning(|id| Ok(Some(testing::user(id, date(2020, 1, 6)))));
        mocks
            .assignments
            .expect_count_active_for_user()
            .returning(|_| Ok(0));
        mocks
            .users
            .expect_soft_delete()
            .with(mockall::predicate::eq(id))
            .times(1)
            .returning(|_| Ok(true));

        service(mocks).delete(id).await.expect("user deleted");
    }
}
