fn main() {
    // Only device builds need the ESP-IDF sysenv; host test builds skip it.
    if std::env::var("CARGO_FEATURE_ESPIDF").is_ok() {
        embuild::espidf::sysenv::output();
    }
}
