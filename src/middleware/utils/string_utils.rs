use surrealdb::sql::{Id, Thing};

use crate::middleware::error::{AppError, AppResult};

/// Record id for a key coming from a request path or body.
/// Accepts both `key` and `table:key`, the table prefix must match.
pub fn get_str_thing(table: &str, value: &str) -> AppResult<Thing> {
    let key = match value.split_once(':') {
        Some((tb, key)) if tb == table => key,
        Some(_) => {
            return Err(AppError::invalid(format!(
                "{value} is not a {table} id"
            )))
        }
        None => value,
    };
    if key.is_empty() {
        return Err(AppError::invalid(format!("empty {table} id")));
    }
    Ok(Thing::from((table, key)))
}

/// New time ordered record id.
pub fn new_thing(table: &str) -> Thing {
    Thing::from((table.to_string(), Id::ulid()))
}

/// Key part of a record id, as exposed through the web-service.
pub fn thing_key(thing: &Thing) -> String {
    thing.id.to_raw()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_and_prefixed_keys() {
        let a = get_str_thing("post", "01HX").unwrap();
        let b = get_str_thing("post", "post:01HX").unwrap();
        assert_eq!(a, b);
        assert_eq!(thing_key(&a), "01HX");
    }

    #[test]
    fn rejects_foreign_tables() {
        assert!(get_str_thing("post", "forum:01HX").is_err());
        assert!(get_str_thing("post", "").is_err());
    }

    #[test]
    fn generated_ids_sort_by_creation() {
        let first = new_thing("post");
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = new_thing("post");
        assert!(thing_key(&first) < thing_key(&second));
    }
}
