diesel::table! {
    item_status (order_id, item_name) {
        order_id -> Int4,
        item_name -> Text,
        last_updated -> Timestamptz,
        status -> Text,
        comments -> Text,
    }
}

diesel::table! {
    menu (item_name) {
        item_name -> Text,
        #[sql_name = "type"]
        type_ -> Text,
        price -> Numeric,
        description -> Text,
        image_url -> Text,
    }
}

diesel::table! {
    orders (order_id) {
        order_id -> Int4,
        login -> Text,
        paid -> Bool,
        timestamp_recieved -> Timestamptz,
        total -> Numeric,
    }
}

diesel::table! {
    users (login) {
        login -> Text,
        phone_num -> Text,
        password -> Text,
        fav_items -> Text,
        #[sql_name = "type"]
        type_ -> Text,
    }
}

diesel::joinable!(orders -> users (login));
diesel::joinable!(item_status -> orders (order_id));

diesel::allow_tables_to_appear_in_same_query!(
    item_status,
    menu,
    orders,
    users,
);
