//! Every database operation in the program, one function per statement.
//! Queries are built with the diesel DSL so all user input travels as bound
//! parameters, never as spliced SQL text.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::dsl::max;
use diesel::prelude::*;
use diesel::sql_types::{Integer, Text};

use crate::models::{ItemStatus, MenuItem, Order, Role, User};
use crate::schema;

pub fn create_user(conn: &mut PgConnection, user: &User) -> QueryResult<()> {
    use schema::users::dsl::*;
    diesel::insert_into(users).values(user).execute(conn)?;
    Ok(())
}

/// True when at least one row has this exact login/password pair. Cannot
/// tell a wrong password from a missing user, and does not need to.
pub fn credentials_match(conn: &mut PgConnection, who: &str, pass: &str) -> QueryResult<bool> {
    use schema::users::dsl::*;
    let matches: i64 = users
        .filter(login.eq(who).and(password.eq(pass)))
        .count()
        .get_result(conn)?;
    Ok(matches > 0)
}

/// The authorization check: re-queries the role on every call so a role
/// change takes effect mid-session.
pub fn has_role(conn: &mut PgConnection, who: &str, role: Role) -> QueryResult<bool> {
    use schema::users::dsl::*;
    let matches: i64 = users
        .filter(login.eq(who).and(type_.eq(role.as_str())))
        .count()
        .get_result(conn)?;
    Ok(matches > 0)
}

pub fn is_staff(conn: &mut PgConnection, who: &str) -> QueryResult<bool> {
    use schema::users::dsl::*;
    let staff_roles = [Role::Employee.as_str(), Role::Manager.as_str()];
    let matches: i64 = users
        .filter(login.eq(who).and(type_.eq_any(staff_roles)))
        .count()
        .get_result(conn)?;
    Ok(matches > 0)
}

pub enum ProfileField {
    Login(String),
    Phone(String),
    Password(String),
    FavItems(String),
    Role(String),
}

pub fn update_profile(
    conn: &mut PgConnection,
    target: &str,
    field: &ProfileField,
) -> QueryResult<usize> {
    use schema::users::dsl::*;
    match field {
        ProfileField::Login(v) => diesel::update(users.filter(login.eq(target)))
            .set(login.eq(v))
            .execute(conn),
        ProfileField::Phone(v) => diesel::update(users.filter(login.eq(target)))
            .set(phone_num.eq(v))
            .execute(conn),
        ProfileField::Password(v) => diesel::update(users.filter(login.eq(target)))
            .set(password.eq(v))
            .execute(conn),
        ProfileField::FavItems(v) => diesel::update(users.filter(login.eq(target)))
            .set(fav_items.eq(v))
            .execute(conn),
        ProfileField::Role(v) => diesel::update(users.filter(login.eq(target)))
            .set(type_.eq(v))
            .execute(conn),
    }
}

pub fn menu_items_by_name(conn: &mut PgConnection, name: &str) -> QueryResult<Vec<MenuItem>> {
    use schema::menu::dsl::*;
    menu.filter(item_name.eq(name))
        .select(MenuItem::as_select())
        .load(conn)
}

/// Exact match on the type column, no pattern expansion.
pub fn menu_items_by_type(conn: &mut PgConnection, kind: &str) -> QueryResult<Vec<MenuItem>> {
    use schema::menu::dsl::*;
    menu.filter(type_.eq(kind))
        .select(MenuItem::as_select())
        .load(conn)
}

pub fn add_menu_item(conn: &mut PgConnection, item: &MenuItem) -> QueryResult<()> {
    use schema::menu::dsl::*;
    diesel::insert_into(menu).values(item).execute(conn)?;
    Ok(())
}

pub fn delete_menu_item(conn: &mut PgConnection, name: &str) -> QueryResult<usize> {
    use schema::menu::dsl::*;
    diesel::delete(menu.filter(item_name.eq(name))).execute(conn)
}

pub fn update_menu_item(
    conn: &mut PgConnection,
    target: &str,
    updated: &MenuItem,
) -> QueryResult<usize> {
    use schema::menu::dsl::*;
    diesel::update(menu.filter(item_name.eq(target)))
        .set((
            item_name.eq(&updated.item_name),
            type_.eq(&updated.type_),
            price.eq(&updated.price),
            description.eq(&updated.description),
            image_url.eq(&updated.image_url),
        ))
        .execute(conn)
}

pub fn item_price(conn: &mut PgConnection, name: &str) -> QueryResult<Option<BigDecimal>> {
    use schema::menu::dsl::*;
    menu.filter(item_name.eq(name))
        .select(price)
        .first(conn)
        .optional()
}

pub fn create_order(conn: &mut PgConnection, order: &Order) -> QueryResult<()> {
    use schema::orders::dsl::*;
    diesel::insert_into(orders).values(order).execute(conn)?;
    Ok(())
}

pub fn order(conn: &mut PgConnection, id: i32) -> QueryResult<Option<Order>> {
    use schema::orders::dsl::*;
    orders
        .find(id)
        .select(Order::as_select())
        .first(conn)
        .optional()
}

pub fn orders_for(conn: &mut PgConnection, who: &str) -> QueryResult<Vec<Order>> {
    use schema::orders::dsl::*;
    orders
        .filter(login.eq(who))
        .order_by(order_id.asc())
        .select(Order::as_select())
        .load(conn)
}

pub fn unpaid_orders_since(
    conn: &mut PgConnection,
    cutoff: DateTime<Utc>,
) -> QueryResult<Vec<Order>> {
    use schema::orders::dsl::*;
    orders
        .filter(paid.eq(false).and(timestamp_recieved.ge(cutoff)))
        .order_by(order_id.asc())
        .select(Order::as_select())
        .load(conn)
}

pub fn mark_paid(conn: &mut PgConnection, id: i32) -> QueryResult<usize> {
    use schema::orders::dsl::*;
    diesel::update(orders.find(id)).set(paid.eq(true)).execute(conn)
}

pub fn set_order_total(conn: &mut PgConnection, id: i32, amount: &BigDecimal) -> QueryResult<usize> {
    use schema::orders::dsl::*;
    diesel::update(orders.find(id)).set(total.eq(amount)).execute(conn)
}

pub fn max_order_id(conn: &mut PgConnection) -> QueryResult<Option<i32>> {
    use schema::orders::dsl::*;
    orders.select(max(order_id)).first(conn)
}

pub fn add_item_status(conn: &mut PgConnection, status_row: &ItemStatus) -> QueryResult<()> {
    use schema::item_status::dsl::*;
    diesel::insert_into(item_status)
        .values(status_row)
        .execute(conn)?;
    Ok(())
}

pub fn statuses_for(conn: &mut PgConnection, id: i32) -> QueryResult<Vec<ItemStatus>> {
    use schema::item_status::dsl::*;
    item_status
        .filter(order_id.eq(id))
        .order_by(last_updated.asc())
        .select(ItemStatus::as_select())
        .load(conn)
}

/// Deletes one status row matching (order id, item name). The table has no
/// row identifier, so a single row is pinned through its ctid; duplicate
/// servings of the same item survive the removal.
pub fn remove_one_item(conn: &mut PgConnection, id: i32, name: &str) -> QueryResult<usize> {
    diesel::sql_query(
        "DELETE FROM item_status WHERE ctid = (SELECT ctid FROM item_status \
         WHERE order_id = $1 AND item_name = $2 LIMIT 1)",
    )
    .bind::<Integer, _>(id)
    .bind::<Text, _>(name)
    .execute(conn)
}
