use axum::{http::StatusCode, response::IntoResponse, Json};

use crate::JsonResponse;

#[derive(Debug)]
pub enum RequestError {
    AuthorizationHeader,
    MissingUser,
    MissingCredentials,
    IncorrectCredentials,
    UserExists,
    UnauthorizedUser(&'static str),
    PostNotFound,
    NoPosts,
    CreatePost,
    TokenVerification(jsonwebtoken::errors::Error),
    ServerError,
    DatabaseError(sqlx::Error),
}

#[derive(serde::Serialize)]
pub struct RequestErrorJson {
    name: String,
    message: String,
}

impl From<sqlx::Error> for RequestError {
    fn from(value: sqlx::Error) -> Self {
        Self::DatabaseError(value)
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> axum::response::Response {
        self.to_json_response().into_response()
    }
}

impl RequestError {
    pub fn name(&self) -> &'static str {
        match self {
            RequestError::AuthorizationHeader => "AuthorizationHeaderError",
            RequestError::MissingUser => "MissingUserError",
            RequestError::MissingCredentials => "MissingCredentialsError",
            RequestError::IncorrectCredentials => "IncorrectCredentialsError",
            RequestError::UserExists => "UserExistsError",
            RequestError::UnauthorizedUser(_) => "UnauthorizedUserError",
            RequestError::PostNotFound => "PostNotFoundError",
            RequestError::NoPosts => "NoPostsError",
            RequestError::CreatePost => "CreatePostError",
            // the verification error keeps its own name
            RequestError::TokenVerification(e) => match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => "TokenExpiredError",
                _ => "JsonWebTokenError",
            },
            RequestError::ServerError => "InternalServerError",
            RequestError::DatabaseError(_) => "DatabaseError",
        }
    }

    pub fn message(&self) -> String {
        match self {
            RequestError::AuthorizationHeader => {
                "Authorization token must start with Bearer ".to_string()
            }
            RequestError::MissingUser => {
                "You must be logged in to perform this action".to_string()
            }
            RequestError::MissingCredentials => {
                "Please supply both a username and password".to_string()
            }
            RequestError::IncorrectCredentials => "Username or password is incorrect".to_string(),
            RequestError::UserExists => "A user by that username already exists".to_string(),
            RequestError::UnauthorizedUser(message) => message.to_string(),
            RequestError::PostNotFound => "That post does not exist".to_string(),
            RequestError::NoPosts => "There are no posts with that tag".to_string(),
            RequestError::CreatePost => "Unable to create post".to_string(),
            RequestError::TokenVerification(e) => e.to_string(),
            RequestError::ServerError => "Internal Server Error".to_string(),
            RequestError::DatabaseError(e) => e.to_string(),
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            RequestError::AuthorizationHeader | RequestError::MissingCredentials => {
                StatusCode::BAD_REQUEST
            }
            RequestError::MissingUser
            | RequestError::IncorrectCredentials
            | RequestError::TokenVerification(_) => StatusCode::UNAUTHORIZED,
            RequestError::UnauthorizedUser(_) => StatusCode::FORBIDDEN,
            RequestError::PostNotFound | RequestError::NoPosts => StatusCode::NOT_FOUND,
            RequestError::UserExists => StatusCode::CONFLICT,
            RequestError::CreatePost => StatusCode::UNPROCESSABLE_ENTITY,
            RequestError::ServerError | RequestError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn to_json_response(&self) -> JsonResponse<RequestErrorJson> {
        if let RequestError::DatabaseError(e) = self {
            eprintln!("Database error: {}", e);
        }
        (
            self.status_code(),
            Json(RequestErrorJson {
                name: self.name().to_string(),
                message: self.message(),
            }),
        )
    }
}

impl std::fmt::Display for RequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name(), self.message())
    }
}

impl std::error::Error for RequestError {}
