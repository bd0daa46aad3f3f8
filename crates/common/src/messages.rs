//! Texts shown by the payment form.
//!
//! Inline validation texts are the field label followed by the message, the
//! way they read once whitespace is collapsed.

pub const APPROVED_NOTIFICATION: &str = "Операция одобрена Банком.";
pub const DECLINED_NOTIFICATION: &str = "Ошибка! Банк отказал в проведении операции.";

pub const NUMBER_INVALID_FORMAT: &str = "Номер карты Неверный формат";
pub const MONTH_INVALID_FORMAT: &str = "Месяц Неверный формат";
pub const MONTH_WRONG_EXPIRY: &str = "Месяц Неверно указан срок действия карты";
pub const YEAR_INVALID_FORMAT: &str = "Год Неверный формат";
pub const YEAR_EXPIRED: &str = "Год Истёк срок действия карты";
pub const YEAR_WRONG_EXPIRY: &str = "Год Неверно указан срок действия карты";
pub const HOLDER_REQUIRED: &str = "Владелец Поле обязательно для заполнения";
pub const CVC_INVALID_FORMAT: &str = "CVC/CVV Неверный формат";
