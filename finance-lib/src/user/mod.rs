pub type UserId = String;
