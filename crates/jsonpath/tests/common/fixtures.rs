use serde_json::{Value, json};

/// The bookstore document used throughout RFC 9535.
pub fn bookstore() -> Value {
    json!({
        "store": {
            "book": [
                {
                    "category": "reference",
                    "author": "Nigel Rees",
                    "title": "Sayings of the Century",
                    "price": 8.95
                },
                {
                    "category": "fiction",
                    "author": "Evelyn Waugh",
                    "title": "Sword of Honour",
                    "price": 12.99
                },
                {
                    "category": "fiction",
                    "author": "Herman Melville",
                    "title": "Moby Dick",
                    "isbn": "0-553-21311-3",
                    "price": 8.99
                },
                {
                    "category": "fiction",
                    "author": "J. R. R. Tolkien",
                    "title": "The Lord of the Rings",
                    "isbn": "0-395-19395-8",
                    "price": 22.99
                }
            ],
            "bicycle": {
                "color": "red",
                "price": 19.95
            }
        },
        "expensive": 10
    })
}

pub fn five_strings() -> Value {
    json!(["first", "second", "third", "forth", "fifth"])
}

/// Objects with a `key` member of every JSON kind, plus one without it.
pub fn keys_of_every_kind() -> Value {
    json!([
        {"some": "some value"},
        {"key": true},
        {"key": false},
        {"key": null},
        {"key": "value"},
        {"key": ""},
        {"key": 0},
        {"key": 1},
        {"key": -1},
        {"key": 42},
        {"key": {}},
        {"key": []}
    ])
}

/// Numeric and string `key` members around 42.
pub fn keys_around_42() -> Value {
    json!([
        {"key": 0},
        {"key": 42},
        {"key": -1},
        {"key": 41},
        {"key": 43},
        {"key": 42.0001},
        {"key": 41.9999},
        {"key": 100},
        {"key": "43"},
        {"key": "42"},
        {"key": "41"},
        {"key": "value"},
        {"some": "value"}
    ])
}
