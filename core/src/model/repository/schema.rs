diesel::table! {
    image (id) {
        id -> BigInt,
        parent -> Nullable<BigInt>,
        basename -> Text,
        uri -> Text,
        width -> Integer,
        height -> Integer,
    }
}
