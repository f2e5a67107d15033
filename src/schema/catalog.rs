//! Built-in entity declarations for the identity and access tables.

use crate::schema::{Audit, EntityDef, FieldDef, Format, KeyDef};

const PERMISSION_NAME: &str = r"^[a-z_]+:[a-z_]+$";
const SLUG: &str = r"^[a-z0-9]+(-[a-z0-9]+)*$";

pub fn builtin_entities() -> Vec<EntityDef> {
    vec![
        EntityDef::new("users", "User", KeyDef::Serial, Audit::Full)
            .field(FieldDef::text("username").required().max_length(50))
            .field(FieldDef::text("email").required().max_length(255).format(Format::Email))
            .field(FieldDef::text("password_hash").required().max_length(255).hidden())
            .field(FieldDef::text("full_name").max_length(100))
            .field(FieldDef::boolean("is_active"))
            .field(FieldDef::boolean("is_verified"))
            .field(FieldDef::timestamp("last_login_at").nullable()),
        EntityDef::new("user_profiles", "User profile", KeyDef::Serial, Audit::Tracked)
            .field(FieldDef::uint("user_id").required())
            .field(FieldDef::text("avatar_url").max_length(500).format(Format::Url))
            .field(FieldDef::text("bio").max_length(1000))
            .field(FieldDef::text("phone").max_length(20))
            .field(FieldDef::text("locale").max_length(10))
            .field(FieldDef::text("timezone").max_length(50)),
        EntityDef::new("roles", "Role", KeyDef::Serial, Audit::Full)
            .field(FieldDef::text("name").required().max_length(50))
            .field(FieldDef::text("description").max_length(255))
            .field(FieldDef::boolean("is_system")),
        EntityDef::new("permissions", "Permission", KeyDef::Serial, Audit::Full)
            .field(FieldDef::text("name").required().max_length(100).pattern(PERMISSION_NAME))
            .field(FieldDef::text("resource").required().max_length(50))
            .field(FieldDef::text("action").required().max_length(50))
            .field(FieldDef::text("description").max_length(255)),
        EntityDef::new(
            "role_permissions",
            "Role permission",
            KeyDef::Composite("role_id", "permission_id"),
            Audit::Created,
        ),
        EntityDef::new("user_roles", "User role", KeyDef::Composite("user_id", "role_id"), Audit::Created),
        EntityDef::new("groups", "Group", KeyDef::Serial, Audit::Full)
            .field(FieldDef::text("name").required().max_length(100))
            .field(FieldDef::text("description").max_length(255)),
        EntityDef::new("group_members", "Group member", KeyDef::Composite("group_id", "user_id"), Audit::Created),
        EntityDef::new("organizations", "Organization", KeyDef::Serial, Audit::Full)
            .field(FieldDef::text("name").required().max_length(100))
            .field(FieldDef::text("slug").required().max_length(100).pattern(SLUG))
            .field(FieldDef::text("description").max_length(500))
            .field(FieldDef::boolean("is_active")),
        EntityDef::new(
            "organization_members",
            "Organization member",
            KeyDef::Composite("organization_id", "user_id"),
            Audit::Tracked,
        )
        .field(FieldDef::text("member_role").required().max_length(50)),
        EntityDef::new("sessions", "Session", KeyDef::Serial, Audit::Tracked)
            .field(FieldDef::uint("user_id").required())
            .field(FieldDef::text("session_token").required().format(Format::Uuid).hidden())
            .field(FieldDef::text("ip_address").max_length(45))
            .field(FieldDef::text("user_agent").max_length(500))
            .field(FieldDef::timestamp("expires_at").required())
            .field(FieldDef::boolean("revoked")),
        EntityDef::new("refresh_tokens", "Refresh token", KeyDef::Serial, Audit::Tracked)
            .field(FieldDef::uint("user_id").required())
            .field(FieldDef::text("token_hash").required().max_length(255).hidden())
            .field(FieldDef::timestamp("expires_at").required())
            .field(FieldDef::boolean("revoked")),
        EntityDef::new("password_reset_tokens", "Password reset token", KeyDef::Serial, Audit::Created)
            .field(FieldDef::uint("user_id").required())
            .field(FieldDef::text("token_hash").required().max_length(255).hidden())
            .field(FieldDef::timestamp("expires_at").required())
            .field(FieldDef::boolean("used")),
        EntityDef::new("email_verification_tokens", "Email verification token", KeyDef::Serial, Audit::Created)
            .field(FieldDef::uint("user_id").required())
            .field(FieldDef::text("token_hash").required().max_length(255).hidden())
            .field(FieldDef::timestamp("expires_at").required())
            .field(FieldDef::timestamp("verified_at").nullable()),
        EntityDef::new("api_keys", "API key", KeyDef::Serial, Audit::Full)
            .field(FieldDef::uint("user_id").required())
            .field(FieldDef::text("name").required().max_length(100))
            .field(FieldDef::text("key_prefix").required().max_length(16))
            .field(FieldDef::text("key_hash").required().max_length(255).hidden())
            .field(FieldDef::timestamp("last_used_at").nullable())
            .field(FieldDef::timestamp("expires_at").nullable())
            .field(FieldDef::boolean("is_active")),
        EntityDef::new("oauth_accounts", "OAuth account", KeyDef::Serial, Audit::Tracked)
            .field(FieldDef::uint("user_id").required())
            .field(FieldDef::text("provider").required().max_length(50))
            .field(FieldDef::text("provider_user_id").required().max_length(255))
            .field(FieldDef::text("access_token").hidden())
            .field(FieldDef::text("refresh_token").hidden())
            .field(FieldDef::timestamp("expires_at").nullable()),
        EntityDef::new("audit_logs", "Audit log", KeyDef::Serial, Audit::Created)
            .field(FieldDef::uint("user_id").nullable())
            .field(FieldDef::text("action").required().max_length(100))
            .field(FieldDef::text("resource").required().max_length(100))
            .field(FieldDef::text("resource_id").max_length(100))
            .field(FieldDef::text("ip_address").max_length(45))
            .field(FieldDef::text("details").max_length(2000)),
        EntityDef::new("login_attempts", "Login attempt", KeyDef::Serial, Audit::None)
            .field(FieldDef::text("username").required().max_length(50))
            .field(FieldDef::text("ip_address").required().max_length(45))
            .field(FieldDef::boolean("success"))
            .field(FieldDef::timestamp("attempted_at").required()),
    ]
}
