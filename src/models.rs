use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::schema::{item_status, menu, orders, users};

/// The three account types the café recognizes. The `type` column itself is
/// free text (a manager can set it to anything), so rows keep a `String` and
/// this enum only drives authorization checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Customer,
    Employee,
    Manager,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Customer => "Customer",
            Role::Employee => "Employee",
            Role::Manager => "Manager",
        }
    }
}

#[derive(Queryable, Selectable, Identifiable, Insertable, Debug, PartialEq)]
#[diesel(table_name = users, primary_key(login))]
pub struct User {
    pub login: String,
    pub phone_num: String,
    pub password: String,
    pub fav_items: String,
    pub type_: String,
}

#[derive(Queryable, Selectable, Identifiable, Insertable, Debug, PartialEq)]
#[diesel(table_name = menu, primary_key(item_name))]
pub struct MenuItem {
    pub item_name: String,
    pub type_: String,
    pub price: BigDecimal,
    pub description: String,
    pub image_url: String,
}

#[derive(Queryable, Selectable, Identifiable, Insertable, Debug, PartialEq)]
#[diesel(table_name = orders, primary_key(order_id))]
pub struct Order {
    pub order_id: i32,
    pub login: String,
    pub paid: bool,
    pub timestamp_recieved: DateTime<Utc>,
    pub total: BigDecimal,
}

#[derive(Queryable, Selectable, Insertable, Debug, PartialEq)]
#[diesel(table_name = item_status)]
pub struct ItemStatus {
    pub order_id: i32,
    pub item_name: String,
    pub last_updated: DateTime<Utc>,
    pub status: String,
    pub comments: String,
}
