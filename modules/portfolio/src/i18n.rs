//! UI strings in English, Uzbek and Russian.
//!
//! Lookup falls back from the requested language to English and from there to
//! the key itself.

use serde::Serialize;

pub const DEFAULT_LANG: &str = "en";

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Language {
    pub code: &'static str,
    pub label: &'static str,
}

pub const LANGUAGES: &[Language] = &[
    Language {
        code: "en",
        label: "English",
    },
    Language {
        code: "uz",
        label: "O'zbekcha",
    },
    Language {
        code: "ru",
        label: "Русский",
    },
];

type Table = &'static [(&'static str, &'static str)];

const EN: Table = &[
    ("app_name", "PortfoHub"),
    ("nav_home", "Home"),
    ("nav_my_profile", "My profile"),
    ("nav_create", "Create portfolio"),
    ("nav_settings", "Settings"),
    ("nav_login", "Login"),
    ("nav_register", "Register"),
    ("nav_logout", "Logout"),
    ("section_public_feed_title", "Public feed"),
    ("filter_all_categories", "All categories"),
    ("text_no_portfolios", "No public portfolios found yet."),
    ("auth_register_title", "Create your account"),
    ("auth_login_title", "Log in"),
    ("settings_title", "Profile settings"),
    ("profile_portfolio_section_title", "My work"),
    ("public_portfolio_title", "Selected work"),
    ("err_full_name_required", "Full name is required."),
    ("err_username_required", "Username is required."),
    ("err_username_too_short", "Username must be at least 3 characters."),
    ("err_email_required", "Email is required."),
    ("err_password_required", "Password and confirmation are required."),
    ("err_password_mismatch", "Passwords do not match."),
    ("err_password_too_short", "Password must be at least 6 characters."),
    ("err_username_taken", "This username is already taken."),
    ("err_email_taken", "This email is already registered."),
    ("err_title_required", "Title is required."),
    (
        "err_avatar_not_image",
        "Avatar must be an image file (jpg, jpeg, png, gif).",
    ),
    (
        "err_image_not_image",
        "Portfolio image must be an image file (jpg, jpeg, png, gif).",
    ),
    ("flash_registered", "Registration successful! You can now log in."),
    ("flash_logged_in", "Logged in successfully."),
    ("flash_invalid_credentials", "Invalid username/email or password."),
    ("flash_logged_out", "You have been logged out."),
    ("flash_login_required", "Please log in to access this page."),
    ("flash_profile_updated", "Profile updated successfully."),
    ("flash_item_created", "Portfolio item created."),
    ("flash_item_updated", "Portfolio item updated."),
    ("flash_item_deleted", "Portfolio item deleted."),
];

const UZ: Table = &[
    ("app_name", "PortfoHub"),
    ("nav_home", "Bosh sahifa"),
    ("nav_my_profile", "Profilim"),
    ("nav_create", "Portfolio qo‘shish"),
    ("nav_settings", "Sozlamalar"),
    ("nav_login", "Kirish"),
    ("nav_register", "Ro‘yxatdan o‘tish"),
    ("nav_logout", "Chiqish"),
    ("section_public_feed_title", "Ochiq feed"),
    ("filter_all_categories", "Barcha kategoriyalar"),
    ("text_no_portfolios", "Hozircha ochiq portfoliolar topilmadi."),
    ("auth_register_title", "Akkaunt yaratish"),
    ("auth_login_title", "Tizimga kirish"),
    ("settings_title", "Profil sozlamalari"),
    ("profile_portfolio_section_title", "Mening ishlarim"),
    ("public_portfolio_title", "Tanlangan ishlar"),
];

const RU: Table = &[
    ("app_name", "PortfoHub"),
    ("nav_home", "Главная"),
    ("nav_my_profile", "Мой профиль"),
    ("nav_create", "Добавить портфолио"),
    ("nav_settings", "Настройки"),
    ("nav_login", "Войти"),
    ("nav_register", "Регистрация"),
    ("nav_logout", "Выйти"),
    ("section_public_feed_title", "Лента"),
    ("filter_all_categories", "Все категории"),
    ("text_no_portfolios", "Публичные портфолио пока не найдены."),
    ("auth_register_title", "Создание аккаунта"),
    ("auth_login_title", "Вход"),
    ("settings_title", "Настройки профиля"),
    ("profile_portfolio_section_title", "Мои работы"),
    ("public_portfolio_title", "Выбранные работы"),
];

fn table(lang: &str) -> Option<Table> {
    match lang {
        "en" => Some(EN),
        "uz" => Some(UZ),
        "ru" => Some(RU),
        _ => None,
    }
}

fn lookup(table: Table, key: &str) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// Known language code, or `en`.
pub fn resolve_lang(code: Option<&str>) -> &'static str {
    code.and_then(|c| LANGUAGES.iter().find(|l| l.code == c))
        .map_or(DEFAULT_LANG, |l| l.code)
}

pub fn translate<'a>(lang: &str, key: &'a str) -> &'a str {
    table(lang)
        .and_then(|t| lookup(t, key))
        .or_else(|| lookup(EN, key))
        .unwrap_or(key)
}

/// Navigation labels in `lang`, keyed like the translation table.
pub fn nav_labels(lang: &str) -> Vec<(&'static str, &'static str)> {
    EN.iter()
        .filter(|(k, _)| k.starts_with("nav_") || *k == "app_name")
        .map(|(k, _)| (*k, translate(lang, k)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_language_wins() {
        assert_eq!(translate("ru", "nav_home"), "Главная");
        assert_eq!(translate("uz", "auth_login_title"), "Tizimga kirish");
    }

    #[test]
    fn falls_back_to_english_then_key() {
        assert_eq!(
            translate("ru", "flash_logged_in"),
            "Logged in successfully."
        );
        assert_eq!(translate("xx", "nav_home"), "Home");
        assert_eq!(translate("en", "no_such_key"), "no_such_key");
        assert_eq!(translate("ru", "no_such_key"), "no_such_key");
    }

    #[test]
    fn unknown_codes_resolve_to_english() {
        assert_eq!(resolve_lang(Some("uz")), "uz");
        assert_eq!(resolve_lang(Some("de")), "en");
        assert_eq!(resolve_lang(None), "en");
    }

    #[test]
    fn every_language_has_full_nav() {
        for lang in LANGUAGES {
            let labels = nav_labels(lang.code);
            assert_eq!(labels.len(), 8);
            assert!(labels.iter().all(|(k, v)| k != v));
        }
    }
}
