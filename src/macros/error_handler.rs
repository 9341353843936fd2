/// unwrap a `CustomResult` inside a route, or log the error and return it as
/// an `ApiError`
macro_rules! handle_error_http {
    ( $data:expr, $target:expr, $type_str:expr) => {
        match $data {
            Ok(e) => e,
            Err(error) => {
                if error.is_client_error() {
                    log::warn!(target:$target, "Rejected request for {}. (error: {})", $type_str, error);
                } else {
                    log::error!(target:$target, "Error getting {}. (error: {})", $type_str, error);
                }
                return Err($crate::errors::ApiError::from(error));
            }
        }
    };
}

pub(crate) use handle_error_http;
