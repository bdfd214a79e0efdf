//! Ready-made message bodies for quick manual testing, keyed by MTI.

pub const SAMPLE_MESSAGES: &[(&str, &str)] = &[
    (
        "0100",
        "MTI=0100|F2=4000123456789012|F3=000000|F4=000000001000|F7=0101120000|F11=000001|F12=120000|F13=0101|F18=5999|F22=012|F25=00|F37=000000000001|F41=TERM001 |F42=MERCHANT001    |F49=840",
    ),
    (
        "0200",
        "MTI=0200|F2=4000123456789012|F3=000000|F4=000000001000|F7=0101120000|F11=000001|F12=120000|F13=0101|F18=5999|F22=012|F25=00|F37=000000000001|F41=TERM001 |F42=MERCHANT001    |F49=840",
    ),
    (
        "0800",
        "MTI=0800|F7=0101120000|F11=000001|F12=120000|F13=0101|F70=301",
    ),
    (
        "0900",
        "MTI=0900|F7=0101120000|F11=000001|F12=120000|F13=0101|F70=301",
    ),
];

pub fn sample_message(key: &str) -> Option<&'static str> {
    SAMPLE_MESSAGES
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, body)| *body)
}
