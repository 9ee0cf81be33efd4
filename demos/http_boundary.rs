use coded_errors::{definitions, error, wrap, Error, FieldError, Result};

/// Pretend storage layer.
fn find_user(id: u64) -> Result<String> {
    if id == 0 {
        return Err(error!("user {} does not exist", id; definitions::USER_NOT_FOUND));
    }
    Ok(format!("user-{id}"))
}

/// Pretend service layer: wraps whatever storage returned.
fn load_profile(id: u64) -> Result<String> {
    find_user(id).map_err(|err| wrap!(err, "loading profile {}", id))
}

fn validate_signup(email: &str, age: u32) -> Result<()> {
    let mut fields = Vec::new();
    if email.is_empty() {
        fields.push(FieldError::new("email", "required", "", "email is required"));
    }
    if age < 18 {
        fields.push(FieldError::new("age", "min", "18", "must be an adult"));
    }
    if fields.is_empty() {
        return Ok(());
    }
    Err(Error::validation("signup rejected", fields))
}

/// What an HTTP handler would send: status line plus JSON body.
fn respond(err: &Error) -> (u16, String) {
    let body = err
        .to_json()
        .unwrap_or_else(|_| String::from(r#"{"code":"GenericErrorCode-90500"}"#));
    (err.http_status(), body)
}

fn main() {
    tracing_subscriber::fmt().with_target(true).init();

    println!("--- HTTP Boundary Example ---\n");

    // 1. Server side: build, wrap, respond.
    let err = match load_profile(0) {
        Ok(profile) => {
            println!("found {profile}");
            return;
        }
        Err(err) => err,
    };
    println!("1. [SERVER] Display: {err}");
    let (status, body) = respond(&err);
    println!("   HTTP {status}\n   {body}\n");

    // 2. Client side: decode and branch on the code, not the message.
    match Error::from_json(&body) {
        Ok(received) if received.has(&definitions::USER_NOT_FOUND, false).is_some() => {
            println!("2. [CLIENT] user missing, showing sign-up page");
        }
        Ok(received) => println!("2. [CLIENT] unexpected error: {received}"),
        Err(decode) => println!("2. [CLIENT] body was not an error object: {decode}"),
    }

    // 3. Validation errors carry field detail to the client.
    if let Err(invalid) = validate_signup("", 16) {
        let (status, body) = respond(&invalid);
        println!("\n3. [SERVER] HTTP {status}\n   {body}");
    }

    // 4. A peer with a newer catalog: the code degrades, a warning is logged.
    let from_newer_peer = r#"{"code":"QuotaError-v2","message":"quota exhausted"}"#;
    if let Ok(degraded) = Error::from_json(from_newer_peer) {
        println!("\n4. [CLIENT] degraded to {} (HTTP {})", degraded.code(), degraded.http_status());
    }
}
