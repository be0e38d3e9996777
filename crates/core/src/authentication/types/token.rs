pub type AccessToken = String;

pub type RefreshToken = String;
