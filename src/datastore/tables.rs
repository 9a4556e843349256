use diesel::{allow_tables_to_appear_in_same_query, joinable, table};

table! {
    users (id) {
        id -> Integer,
        username -> Text,
        joined -> TimestamptzSqlite,
    }
}

table! {
    groups (id) {
        id -> Integer,
        title -> Text,
        slug -> Text,
        description -> Text,
    }
}

table! {
    posts (id) {
        id -> Integer,
        text -> Text,
        pub_date -> TimestamptzSqlite,
        author_id -> Integer,
        group_id -> Nullable<Integer>,
        image -> Nullable<Text>,
    }
}

table! {
    comments (id) {
        id -> Integer,
        post_id -> Nullable<Integer>,
        author_id -> Integer,
        text -> Text,
        created -> TimestamptzSqlite,
    }
}

table! {
    follows (id) {
        id -> Integer,
        user_id -> Nullable<Integer>,
        author_id -> Nullable<Integer>,
    }
}

joinable!(posts -> users (author_id));
joinable!(posts -> groups (group_id));
joinable!(comments -> users (author_id));

allow_tables_to_appear_in_same_query!(users, groups, posts, comments, follows);
