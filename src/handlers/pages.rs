use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, web};

use crate::auth::current_user::SessionUser;
use crate::config::Branding;
use crate::errors::{AppError, render};
use crate::pages;
use crate::templates_structs::{PageContext, PageTemplate};

/// Render the registered page for the request path inside the shell.
pub async fn show(
    req: HttpRequest,
    session: Session,
    user: SessionUser,
    branding: web::Data<Branding>,
) -> Result<HttpResponse, AppError> {
    let page = pages::find(req.path()).ok_or(AppError::NotFound)?;
    let ctx = PageContext::build(&session, user.account(), &branding, page.path);
    render(PageTemplate {
        ctx,
        title: page.full_title(),
        page,
    })
}
