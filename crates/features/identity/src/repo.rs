//! Data access for the `user` table.
//!
//! Reads project the record key into a plain integer `id`; writes bind
//! every field explicitly so the password hash never travels through a
//! serialized model.

use slms_database::{Database, DatabaseError, DatabaseErrorExt};
use slms_domain::constants::USER;
use slms_domain::models::User;
use slms_kernel::server::PageParams;
use surrealdb_types::SurrealValue;

const USER_FIELDS: &str = "record::id(id) AS id, username, email, first_name, last_name, \
                           password, is_staff, is_active, is_superuser, date_joined";

/// Row shape returned by user projections.
#[derive(Debug, SurrealValue)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    first_name: String,
    last_name: String,
    password: String,
    is_staff: bool,
    is_active: bool,
    is_superuser: bool,
    date_joined: i64,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            password: row.password,
            is_staff: row.is_staff,
            is_active: row.is_active,
            is_superuser: row.is_superuser,
            date_joined: row.date_joined,
        }
    }
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: i64,
}

/// Field values for a new account; the caller supplies the already-hashed
/// password.
#[derive(Debug)]
pub(crate) struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct UserRepo {
    db: Database,
}

impl UserRepo {
    pub(crate) const fn new(db: Database) -> Self {
        Self { db }
    }

    pub(crate) async fn find_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        let mut response = self
            .db
            .query(format!("SELECT {USER_FIELDS} FROM type::thing('{USER}', $id)"))
            .bind(("id", id))
            .await
            .context("Loading user by id")?;

        Ok(response.take::<Option<UserRow>>(0)?.map(User::from))
    }

    pub(crate) async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, DatabaseError> {
        let mut response = self
            .db
            .query(format!("SELECT {USER_FIELDS} FROM {USER} WHERE username = $username LIMIT 1"))
            .bind(("username", username.to_owned()))
            .await
            .context("Loading user by username")?;

        Ok(response.take::<Option<UserRow>>(0)?.map(User::from))
    }

    /// Inserts a new account under a freshly allocated id.
    ///
    /// The unique index on `username` backs the caller's duplicate check;
    /// a lost race surfaces as a [`DatabaseError`].
    pub(crate) async fn create(&self, new: NewUser) -> Result<User, DatabaseError> {
        let id = self.db.next_id(USER).await?;
        let date_joined = chrono::Utc::now().timestamp();

        self.db
            .query(format!(
                "CREATE type::thing('{USER}', $id) SET
                    username = $username,
                    password = $password,
                    email = $email,
                    first_name = $first_name,
                    last_name = $last_name,
                    is_staff = $is_staff,
                    is_active = true,
                    is_superuser = false,
                    date_joined = $date_joined
                 RETURN NONE"
            ))
            .bind(("id", id))
            .bind(("username", new.username.clone()))
            .bind(("password", new.password.clone()))
            .bind(("email", new.email.clone()))
            .bind(("first_name", new.first_name.clone()))
            .bind(("last_name", new.last_name.clone()))
            .bind(("is_staff", new.is_staff))
            .bind(("date_joined", date_joined))
            .await
            .context("Creating user")?
            .check()
            .context("Creating user")?;

        Ok(User {
            id,
            username: new.username,
            email: new.email,
            first_name: new.first_name,
            last_name: new.last_name,
            password: new.password,
            is_staff: new.is_staff,
            is_active: true,
            is_superuser: false,
            date_joined,
        })
    }

    /// One page of users plus the total matching the same filter.
    pub(crate) async fn search_page(
        &self,
        search: Option<&str>,
        page: PageParams,
    ) -> Result<(Vec<User>, u64), DatabaseError> {
        let filter = if search.is_some() {
            " WHERE string::lowercase(username) CONTAINS string::lowercase($search)"
        } else {
            ""
        };

        let mut response = self
            .db
            .query(format!(
                "SELECT {USER_FIELDS} FROM {USER}{filter} ORDER BY id LIMIT $limit START $skip"
            ))
            .query(format!("SELECT count() AS total FROM {USER}{filter} GROUP ALL"))
            .bind(("search", search.map(str::to_owned)))
            .bind(("limit", page.limit_i64()))
            .bind(("skip", page.skip_i64()))
            .await
            .context("Listing users")?;

        let users =
            response.take::<Vec<UserRow>>(0)?.into_iter().map(User::from).collect::<Vec<_>>();
        let total = response
            .take::<Option<CountRow>>(1)?
            .map_or(0, |row| u64::try_from(row.total).unwrap_or_default());

        Ok((users, total))
    }
}
