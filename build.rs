fn main() {
    // Credentials are baked in via `option_env!` (see `config::Credentials`).
    for var in [
        "TWILIO_ACCOUNT_SID",
        "TWILIO_AUTH_TOKEN",
        "TWILIO_NUMBER",
        "TO_NUMBER",
        "IMGUR_CLIENT_ID",
        "MQTT_URL",
        "MQTT_TOPIC",
        "MQTT_USERNAME",
        "MQTT_PASSWORD",
        "WIFI_SSID",
        "WIFI_PASSWORD",
        "CAMERA_SNAPSHOT_URL",
    ] {
        println!("cargo:rerun-if-env-changed={var}");
    }

    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
