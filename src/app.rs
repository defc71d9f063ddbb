use std::io::{BufRead, ErrorKind, Write};

use bigdecimal::BigDecimal;
use chrono::{Duration, Utc};
use diesel::PgConnection;
use tracing::debug;

use crate::console::Console;
use crate::error::CafeError;
use crate::models::{ItemStatus, MenuItem, Order, Role, User};
use crate::store::{self, ProfileField};

/// First id handed out against an empty orders table; the seed data numbers
/// orders from here.
const ORDER_ID_FLOOR: i32 = 90_002;

/// In-process order id source, owned by the session loop.
pub struct OrderIds {
    next: i32,
}

impl OrderIds {
    /// Resumes numbering after the highest stored id, so ids stay strictly
    /// increasing within a run and a restart cannot reissue one.
    pub fn seed(conn: &mut PgConnection) -> Result<Self, CafeError> {
        Ok(Self::after(store::max_order_id(conn)?))
    }

    pub fn after(highest: Option<i32>) -> Self {
        OrderIds {
            next: highest.map_or(ORDER_ID_FLOOR, |n| n + 1),
        }
    }

    pub fn take(&mut self) -> i32 {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// Top-level session loop: anonymous menu until a login succeeds, then the
/// user menu until logout. Handler failures are printed and the loop goes on.
pub fn run<R: BufRead, W: Write>(
    conn: &mut PgConnection,
    console: &mut Console<R, W>,
) -> Result<(), CafeError> {
    let mut order_ids = OrderIds::seed(conn)?;
    loop {
        console.line("MAIN MENU")?;
        console.line("---------")?;
        console.line("1. Create user")?;
        console.line("2. Log in")?;
        console.line("9. < EXIT")?;
        let choice = match console.read_choice() {
            Ok(choice) => choice,
            Err(err) if err.kind() == ErrorKind::UnexpectedEof => break,
            Err(err) => return Err(err.into()),
        };
        match choice {
            1 => {
                if let Err(err) = create_user(conn, console) {
                    console.line(&err.to_string())?;
                }
            }
            2 => match log_in(conn, console) {
                Ok(Some(user)) => user_menu(conn, console, &user, &mut order_ids)?,
                Ok(None) => {}
                Err(err) => console.line(&err.to_string())?,
            },
            9 => break,
            _ => console.line("Unrecognized choice!")?,
        }
    }
    Ok(())
}

fn user_menu<R: BufRead, W: Write>(
    conn: &mut PgConnection,
    console: &mut Console<R, W>,
    user: &str,
    order_ids: &mut OrderIds,
) -> Result<(), CafeError> {
    loop {
        console.line("MAIN MENU")?;
        console.line("---------")?;
        console.line("1. Goto Menu")?;
        console.line("2. Update Profile")?;
        console.line("3. Place a Order")?;
        console.line("4. Update a Order")?;
        console.line(".........................")?;
        console.line("9. Log out")?;
        let choice = match console.read_choice() {
            // closed input logs out, it is not a failure
            Ok(choice) => choice,
            Err(err) if err.kind() == ErrorKind::UnexpectedEof => return Ok(()),
            Err(err) => return Err(err.into()),
        };
        let outcome = match choice {
            1 => menu(conn, console, user),
            2 => update_profile(conn, console, user),
            3 => place_order(conn, console, user, order_ids),
            4 => update_order(conn, console, user),
            9 => return Ok(()),
            _ => {
                console.line("Unrecognized choice!")?;
                Ok(())
            }
        };
        if let Err(err) = outcome {
            console.line(&err.to_string())?;
        }
    }
}

fn create_user<R: BufRead, W: Write>(
    conn: &mut PgConnection,
    console: &mut Console<R, W>,
) -> Result<(), CafeError> {
    let login = console.prompt("\tEnter user login: ")?;
    let password = console.prompt("\tEnter user password: ")?;
    let phone = console.prompt("\tEnter user phone: ")?;

    store::create_user(
        conn,
        &User {
            login,
            phone_num: phone,
            password,
            fav_items: String::new(),
            type_: Role::Customer.as_str().to_string(),
        },
    )?;
    console.line("User successfully created!")?;
    Ok(())
}

/// Returns the login string as the session identity when the credentials
/// match at least one row. A bad password and a missing user look the same.
fn log_in<R: BufRead, W: Write>(
    conn: &mut PgConnection,
    console: &mut Console<R, W>,
) -> Result<Option<String>, CafeError> {
    let login = console.prompt("\tEnter user login: ")?;
    let password = console.prompt("\tEnter user password: ")?;

    if store::credentials_match(conn, &login, &password)? {
        debug!(%login, "login accepted");
        Ok(Some(login))
    } else {
        debug!(%login, "login rejected");
        Ok(None)
    }
}

fn menu<R: BufRead, W: Write>(
    conn: &mut PgConnection,
    console: &mut Console<R, W>,
    user: &str,
) -> Result<(), CafeError> {
    if store::has_role(conn, user, Role::Manager)? {
        console.line("===== MANAGER'S VIEW =====")?;
        console.line("Please choose what you wish to do")?;
        console.line("1. Search by item name")?;
        console.line("2. Search by item type")?;
        console.line("3. Add item to menu")?;
        console.line("4. Delete item from menu")?;
        console.line("5. Update item from menu")?;
        match console.read_choice()? {
            1 => search_by_name(conn, console)?,
            2 => search_by_type(conn, console)?,
            3 => {
                let item = read_menu_item(console, &ADD_ITEM_PROMPTS)?;
                store::add_menu_item(conn, &item)?;
            }
            4 => {
                let name = console.prompt("Enter the item name to delete: ")?;
                let deleted = store::delete_menu_item(conn, &name)?;
                debug!(%name, deleted, "menu item delete");
            }
            5 => {
                let target = console.prompt("Please enter the item name to update: ")?;
                let updated = read_menu_item(console, &UPDATE_ITEM_PROMPTS)?;
                store::update_menu_item(conn, &target, &updated)?;
            }
            _ => console.line("Unrecognized choice!")?,
        }
    } else {
        console.line("Please choose what you wish to do")?;
        console.line("1. Search by item name")?;
        console.line("2. Search by item type")?;
        match console.read_choice()? {
            1 => search_by_name(conn, console)?,
            2 => search_by_type(conn, console)?,
            _ => console.line("Unrecognized choice!")?,
        }
    }
    Ok(())
}

fn search_by_name<R: BufRead, W: Write>(
    conn: &mut PgConnection,
    console: &mut Console<R, W>,
) -> Result<(), CafeError> {
    let name = console.prompt("Enter the item name: ")?;
    let rows = store::menu_items_by_name(conn, &name)?;
    console.print_table(&rows)?;
    Ok(())
}

fn search_by_type<R: BufRead, W: Write>(
    conn: &mut PgConnection,
    console: &mut Console<R, W>,
) -> Result<(), CafeError> {
    let kind = console.prompt("Enter the item type: ")?;
    let rows = store::menu_items_by_type(conn, &kind)?;
    console.print_table(&rows)?;
    Ok(())
}

const ADD_ITEM_PROMPTS: [&str; 5] = [
    "Enter the Item Name: ",
    "Enter the Item Type: ",
    "Enter the Item Price: $",
    "Enter the Item Description: ",
    "Enter the Image URL: ",
];

const UPDATE_ITEM_PROMPTS: [&str; 5] = [
    "Enter its updated name: ",
    "Enter its updated type: ",
    "Enter its updated price: $",
    "Enter its updated description: ",
    "Enter its updated image url: ",
];

/// Reads the five menu-item fields, in order: name, type, price,
/// description, image url.
fn read_menu_item<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    prompts: &[&str; 5],
) -> Result<MenuItem, CafeError> {
    let item_name = console.prompt(prompts[0])?;
    let type_ = console.prompt(prompts[1])?;
    let raw_price = console.prompt(prompts[2])?;
    let price = raw_price
        .trim()
        .parse::<BigDecimal>()
        .map_err(|_| CafeError::InvalidPrice(raw_price.clone()))?;
    let description = console.prompt(prompts[3])?;
    let image_url = console.prompt(prompts[4])?;
    Ok(MenuItem {
        item_name,
        type_,
        price,
        description,
        image_url,
    })
}

fn update_profile<R: BufRead, W: Write>(
    conn: &mut PgConnection,
    console: &mut Console<R, W>,
    user: &str,
) -> Result<(), CafeError> {
    let is_manager = store::has_role(conn, user, Role::Manager)?;
    let target = if is_manager {
        console.line("===== MANAGER'S VIEW =====")?;
        console.line("Please choose who to update")?;
        console.line("1. Self")?;
        console.line("2. Other User")?;
        if console.read_choice()? == 2 {
            console.prompt("Enter the users login: ")?
        } else {
            user.to_string()
        }
    } else {
        user.to_string()
    };

    console.line("Please choose what you wish to update")?;
    console.line("1. Login")?;
    console.line("2. Phone Number")?;
    console.line("3. Password")?;
    console.line("4. Favorite Items")?;
    if is_manager {
        console.line("5. User Type")?;
    }
    let field = match console.read_choice()? {
        1 => ProfileField::Login(console.prompt("Enter the new login: ")?),
        2 => ProfileField::Phone(console.prompt("Enter the new phone number: ")?),
        3 => ProfileField::Password(console.prompt("Enter the new password: ")?),
        4 => ProfileField::FavItems(console.prompt("Enter the new favorite items: ")?),
        5 if is_manager => ProfileField::Role(console.prompt("Enter the new user type: ")?),
        _ => {
            console.line("Unrecognized choice!")?;
            return Ok(());
        }
    };
    store::update_profile(conn, &target, &field)?;
    console.line("Success!")?;
    Ok(())
}

fn place_order<R: BufRead, W: Write>(
    conn: &mut PgConnection,
    console: &mut Console<R, W>,
    user: &str,
    order_ids: &mut OrderIds,
) -> Result<(), CafeError> {
    let id = order_ids.take();
    store::create_order(
        conn,
        &Order {
            order_id: id,
            login: user.to_string(),
            paid: false,
            timestamp_recieved: Utc::now(),
            total: BigDecimal::from(0),
        },
    )?;

    console.line("Please enter the names of the items you want to add: (Enter 0 to complete order)")?;
    let mut total = BigDecimal::from(0);
    loop {
        let item = console.prompt("Enter the item you want to add: ")?;
        if item == "0" {
            break;
        }
        match store::item_price(conn, &item)? {
            Some(price) => {
                total += price;
                store::add_item_status(
                    conn,
                    &ItemStatus {
                        order_id: id,
                        item_name: item,
                        last_updated: Utc::now(),
                        status: "Hasn't Started".to_string(),
                        comments: String::new(),
                    },
                )?;
                let rows = store::statuses_for(conn, id)?;
                console.print_table(&rows)?;
            }
            // unknown items are skipped, the order stays open
            None => console.line(&CafeError::UnknownItem(item).to_string())?,
        }
    }
    store::set_order_total(conn, id, &total)?;
    debug!(order_id = id, total = %total, "order placed");

    if let Some(placed) = store::order(conn, id)? {
        console.print_table(&[placed])?;
    }
    Ok(())
}

fn update_order<R: BufRead, W: Write>(
    conn: &mut PgConnection,
    console: &mut Console<R, W>,
    user: &str,
) -> Result<(), CafeError> {
    if store::is_staff(conn, user)? {
        let cutoff = Utc::now() - Duration::days(1);
        let recent = store::unpaid_orders_since(conn, cutoff)?;
        console.print_table(&recent)?;

        let id = console.read_i32("Enter OrderId you wish to update: ")?;
        let order = store::order(conn, id)?.ok_or(CafeError::UnknownOrder(id))?;
        if order.paid {
            console.line("It has already been paid.")?;
            return Ok(());
        }
        let answer = console.prompt("Press YES to change an ORDER to paid: ")?;
        if answer.eq_ignore_ascii_case("yes") {
            store::mark_paid(conn, id)?;
            debug!(order_id = id, "order marked paid");
            console.line("Success!")?;
        }
        return Ok(());
    }

    let own = store::orders_for(conn, user)?;
    console.print_table(&own)?;

    let id = console.read_i32("Enter your orderID: ")?;
    let order = store::order(conn, id)?.ok_or(CafeError::UnknownOrder(id))?;
    if order.paid {
        console.line("It has already been paid.")?;
        return Ok(());
    }

    console.line("1. Add the item.")?;
    console.line("2. Delete the item.")?;
    match console.read_choice()? {
        1 => {
            let name = console.prompt("Enter new item: ")?;
            let price = store::item_price(conn, &name)?
                .ok_or_else(|| CafeError::UnknownItem(name.clone()))?;
            store::add_item_status(
                conn,
                &ItemStatus {
                    order_id: id,
                    item_name: name,
                    last_updated: Utc::now(),
                    status: "Hasn't Started".to_string(),
                    comments: String::new(),
                },
            )?;
            store::set_order_total(conn, id, &(order.total + price))?;
            print_order_state(conn, console, id)?;
        }
        2 => {
            let name = console.prompt("Enter item you want to delete: ")?;
            let price = store::item_price(conn, &name)?
                .ok_or_else(|| CafeError::UnknownItem(name.clone()))?;
            let removed = store::remove_one_item(conn, id, &name)?;
            if removed > 0 {
                store::set_order_total(conn, id, &(order.total - price))?;
            }
            print_order_state(conn, console, id)?;
        }
        _ => console.line("Unrecognized choice!")?,
    }
    Ok(())
}

fn print_order_state<R: BufRead, W: Write>(
    conn: &mut PgConnection,
    console: &mut Console<R, W>,
    id: i32,
) -> Result<(), CafeError> {
    console.print_table(&store::statuses_for(conn, id)?)?;
    if let Some(order) = store::order(conn, id)? {
        console.print_table(&[order])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::establish_connection;
    use crate::schema;
    use diesel::RunQueryDsl;
    use std::io::Cursor;
    use std::str::FromStr;

    #[test]
    fn order_ids_are_strictly_increasing() {
        let mut ids = OrderIds::after(None);
        let first = ids.take();
        assert_eq!(first, 90_002);
        assert!(ids.take() > first);
    }

    #[test]
    fn order_ids_resume_after_highest_stored_id() {
        let mut ids = OrderIds::after(Some(91_000));
        assert_eq!(ids.take(), 91_001);
    }

    fn menu_item(name: &str, kind: &str, amount: &str) -> MenuItem {
        MenuItem {
            item_name: name.to_string(),
            type_: kind.to_string(),
            price: BigDecimal::from_str(amount).unwrap(),
            description: String::new(),
            image_url: String::new(),
        }
    }

    fn order_with_total(id: i32, who: &str, amount: &str) -> Order {
        Order {
            order_id: id,
            login: who.to_string(),
            paid: false,
            timestamp_recieved: Utc::now(),
            total: BigDecimal::from_str(amount).unwrap(),
        }
    }

    fn status_row(id: i32, name: &str) -> ItemStatus {
        ItemStatus {
            order_id: id,
            item_name: name.to_string(),
            last_updated: Utc::now(),
            status: "Hasn't Started".to_string(),
            comments: String::new(),
        }
    }

    fn setup_database(conn: &mut PgConnection) {
        diesel::delete(schema::item_status::table)
            .execute(conn)
            .unwrap();
        diesel::delete(schema::orders::table).execute(conn).unwrap();
        diesel::delete(schema::menu::table).execute(conn).unwrap();
        diesel::delete(schema::users::table).execute(conn).unwrap();
    }

    #[test]
    #[ignore = "requires a running postgres (set DATABASE_URL)"]
    fn scripted_order_skips_unknown_items_and_stops_at_sentinel() {
        let conn = &mut establish_connection();
        setup_database(conn);
        store::add_menu_item(conn, &menu_item("Latte", "Drinks", "4.50")).unwrap();

        let mut ids = OrderIds::after(Some(91_000));
        let script: &[u8] = b"Latte\nNo Such Item\n0\n";
        let mut console = Console::new(Cursor::new(script), Vec::new());
        place_order(conn, &mut console, "frank", &mut ids).unwrap();

        let placed = store::order(conn, 91_001).unwrap().unwrap();
        assert_eq!(placed.total, BigDecimal::from_str("4.50").unwrap());
        assert!(!placed.paid);
        // the unknown item and the sentinel left no status rows behind
        assert_eq!(store::statuses_for(conn, 91_001).unwrap().len(), 1);
    }

    #[test]
    #[ignore = "requires a running postgres (set DATABASE_URL)"]
    fn customer_cannot_touch_items_on_a_paid_order() {
        let conn = &mut establish_connection();
        setup_database(conn);
        store::create_order(
            conn,
            &Order {
                order_id: 92_000,
                login: "grace".to_string(),
                paid: true,
                timestamp_recieved: Utc::now(),
                total: BigDecimal::from(0),
            },
        )
        .unwrap();

        let script: &[u8] = b"92000\n";
        let mut console = Console::new(Cursor::new(script), Vec::new());
        update_order(conn, &mut console, "grace").unwrap();
        // nothing was inserted and the paid flag held
        assert!(store::statuses_for(conn, 92_000).unwrap().is_empty());
        assert!(store::order(conn, 92_000).unwrap().unwrap().paid);
    }

    #[test]
    #[ignore = "requires a running postgres (set DATABASE_URL)"]
    fn removing_an_item_drops_the_total_by_its_price() {
        let conn = &mut establish_connection();
        setup_database(conn);
        store::add_menu_item(conn, &menu_item("Latte", "Drinks", "4.50")).unwrap();
        store::add_menu_item(conn, &menu_item("Muffin", "Food", "3.25")).unwrap();
        store::create_order(conn, &order_with_total(93_000, "heidi", "7.75")).unwrap();
        store::add_item_status(conn, &status_row(93_000, "Latte")).unwrap();
        store::add_item_status(conn, &status_row(93_000, "Muffin")).unwrap();

        let script: &[u8] = b"93000\n2\nLatte\n";
        let mut console = Console::new(Cursor::new(script), Vec::new());
        update_order(conn, &mut console, "heidi").unwrap();

        let after = store::order(conn, 93_000).unwrap().unwrap();
        assert_eq!(after.total, BigDecimal::from_str("3.25").unwrap());
        let remaining = store::statuses_for(conn, 93_000).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].item_name, "Muffin");
    }

    #[test]
    #[ignore = "requires a running postgres (set DATABASE_URL)"]
    fn removal_without_a_matching_row_leaves_the_total_alone() {
        let conn = &mut establish_connection();
        setup_database(conn);
        // Latte is on the menu but not in this order
        store::add_menu_item(conn, &menu_item("Latte", "Drinks", "4.50")).unwrap();
        store::add_menu_item(conn, &menu_item("Muffin", "Food", "3.25")).unwrap();
        store::create_order(conn, &order_with_total(93_010, "heidi", "3.25")).unwrap();
        store::add_item_status(conn, &status_row(93_010, "Muffin")).unwrap();

        let script: &[u8] = b"93010\n2\nLatte\n";
        let mut console = Console::new(Cursor::new(script), Vec::new());
        update_order(conn, &mut console, "heidi").unwrap();

        let after = store::order(conn, 93_010).unwrap().unwrap();
        assert_eq!(after.total, BigDecimal::from_str("3.25").unwrap());
        assert_eq!(store::statuses_for(conn, 93_010).unwrap().len(), 1);
    }

    #[test]
    #[ignore = "requires a running postgres (set DATABASE_URL)"]
    fn manager_item_update_uses_its_own_prompt_wording() {
        let conn = &mut establish_connection();
        setup_database(conn);
        store::create_user(
            conn,
            &User {
                login: "mgr".to_string(),
                phone_num: "555-0100".to_string(),
                password: "secret".to_string(),
                fav_items: String::new(),
                type_: Role::Manager.as_str().to_string(),
            },
        )
        .unwrap();
        store::add_menu_item(conn, &menu_item("Latte", "Drinks", "4.50")).unwrap();

        let script: &[u8] = b"5\nLatte\nFlat White\nDrinks\n4.75\nsmooth\n\n";
        let mut console = Console::new(Cursor::new(script), Vec::new());
        menu(conn, &mut console, "mgr").unwrap();

        let renamed = store::menu_items_by_name(conn, "Flat White").unwrap();
        assert_eq!(renamed.len(), 1);
        assert_eq!(renamed[0].price, BigDecimal::from_str("4.75").unwrap());

        let printed = String::from_utf8(console.into_output()).unwrap();
        assert!(printed.contains("Enter its updated type: "));
        assert!(printed.contains("Enter its updated image url: "));
    }

    #[test]
    #[ignore = "requires a running postgres (set DATABASE_URL)"]
    fn user_menu_logs_out_cleanly_when_input_ends() {
        let conn = &mut establish_connection();
        let mut ids = OrderIds::after(Some(95_000));
        let script: &[u8] = b"";
        let mut console = Console::new(Cursor::new(script), Vec::new());
        assert!(user_menu(conn, &mut console, "anyone", &mut ids).is_ok());
    }
}
