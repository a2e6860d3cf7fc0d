use argon2::Config;

pub fn encode_password(password: &str) -> Result<String, argon2::Error> {
    let config = Config::default();
    let salt: [u8; 32] = rand::random();
    argon2::hash_encoded(password.as_bytes(), &salt, &config)
}
